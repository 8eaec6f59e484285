use cosmo_router_config::telemetry::TelemetryConfig;
use cosmo_router_internal::telemetry::attributes::ClientInfo;
use cosmo_router_internal::telemetry::metrics::catalog::names;
use cosmo_router_internal::telemetry::metrics::data::{AggregatedMetrics, MetricData, ResourceMetrics};

use crate::testkit::subgraphs::{employees_subgraph, FakeTransport};
use crate::testkit::{
    counter_value, graphql_request, graphql_request_with_headers, histogram_count,
    up_down_value, TestRouter,
};

#[tokio::test]
async fn unnamed_query_metrics() {
    let router = TestRouter::new(FakeTransport::employees());
    router
        .call(graphql_request("query { employees { id } }"))
        .await;

    let metrics = router.collect();
    let request = router.employees_request_scope(&ClientInfo::default(), None);
    let subgraph = request.for_subgraph(&employees_subgraph());
    let completed = request.with_status(200);
    let served = request.for_subgraph_with_status(&employees_subgraph(), 200);

    assert_eq!(counter_value(&metrics, names::REQUESTS, &subgraph), Some(1));
    assert_eq!(counter_value(&metrics, names::REQUESTS, &completed), Some(1));

    assert_eq!(
        counter_value(&metrics, names::REQUEST_CONTENT_LENGTH, &subgraph),
        Some(28)
    );
    assert_eq!(
        counter_value(&metrics, names::REQUEST_CONTENT_LENGTH, &completed),
        Some(38)
    );

    assert_eq!(
        counter_value(&metrics, names::RESPONSE_CONTENT_LENGTH, &completed),
        Some(117)
    );
    assert_eq!(
        counter_value(&metrics, names::RESPONSE_CONTENT_LENGTH, &served),
        Some(117)
    );

    assert_eq!(
        histogram_count(&metrics, names::REQUEST_DURATION, &subgraph),
        Some(1)
    );
    assert_eq!(
        histogram_count(&metrics, names::REQUEST_DURATION, &completed),
        Some(1)
    );

    assert_eq!(
        up_down_value(&metrics, names::REQUESTS_IN_FLIGHT, &router.router_scope()),
        Some(0)
    );
    assert_eq!(
        up_down_value(&metrics, names::REQUESTS_IN_FLIGHT, request.as_slice()),
        Some(0)
    );

    // no stray attribute sets: exactly two points per instrument
    for name in [
        names::REQUESTS,
        names::REQUEST_DURATION,
        names::REQUEST_CONTENT_LENGTH,
        names::RESPONSE_CONTENT_LENGTH,
        names::REQUESTS_IN_FLIGHT,
    ] {
        assert_eq!(data_point_count(&metrics, name), 2, "{name}");
    }
}

#[tokio::test]
async fn named_query_metrics_carry_the_name() {
    let router = TestRouter::new(FakeTransport::employees());
    router
        .call(graphql_request("query myQuery { employees { id } }"))
        .await;

    let metrics = router.collect();
    let request = router.employees_request_scope(&ClientInfo::default(), Some("myQuery"));
    assert_eq!(
        counter_value(&metrics, names::REQUESTS, &request.with_status(200)),
        Some(1)
    );

    let unnamed = router.employees_request_scope(&ClientInfo::default(), None);
    assert_eq!(
        counter_value(&metrics, names::REQUESTS, &unnamed.with_status(200)),
        None
    );
}

#[tokio::test]
async fn client_identity_splits_data_points() {
    let router = TestRouter::new(FakeTransport::employees());
    for client in ["web", "ios", "web"] {
        router
            .call(graphql_request_with_headers(
                "query { employees { id } }",
                &[("graphql-client-name", client)],
            ))
            .await;
    }

    let metrics = router.collect();
    let client = |name: &str| ClientInfo {
        name: name.to_string(),
        version: "missing".to_string(),
    };
    let web = router.employees_request_scope(&client("web"), None);
    let ios = router.employees_request_scope(&client("ios"), None);

    assert_eq!(
        counter_value(&metrics, names::REQUESTS, &web.with_status(200)),
        Some(2)
    );
    assert_eq!(
        counter_value(&metrics, names::REQUESTS, &ios.with_status(200)),
        Some(1)
    );
    assert_eq!(
        counter_value(&metrics, names::REQUEST_CONTENT_LENGTH, &web.with_status(200)),
        Some(76)
    );
}

#[tokio::test]
async fn collection_is_cumulative_and_stable() {
    let router = TestRouter::new(FakeTransport::employees());
    router
        .call(graphql_request("query { employees { id } }"))
        .await;

    let first = flatten(&router.collect());
    let second = flatten(&router.collect());
    assert!(!first.is_empty());
    assert_eq!(first, second);

    router
        .call(graphql_request("query { employees { id } }"))
        .await;

    let metrics = router.collect();
    let request = router.employees_request_scope(&ClientInfo::default(), None);
    assert_eq!(
        counter_value(&metrics, names::REQUESTS, &request.with_status(200)),
        Some(2)
    );
    assert_eq!(
        counter_value(&metrics, names::REQUEST_CONTENT_LENGTH, &request.with_status(200)),
        Some(76)
    );
}

#[tokio::test]
async fn metrics_are_reported_under_the_router_scope() {
    let router = TestRouter::new(FakeTransport::employees());
    router
        .call(graphql_request("query { employees { id } }"))
        .await;

    let metrics = router.collect();
    assert_eq!(metrics.scope_metrics.len(), 1);

    let scope = &metrics.scope_metrics[0];
    assert_eq!(scope.scope.name(), "cosmo.router");
    assert_eq!(scope.scope.version(), Some("0.0.1"));

    let registered = scope
        .metrics
        .iter()
        .map(|metric| metric.name.as_ref())
        .collect::<Vec<_>>();
    assert_eq!(
        registered,
        vec![
            names::REQUESTS,
            names::REQUEST_DURATION,
            names::REQUEST_CONTENT_LENGTH,
            names::RESPONSE_CONTENT_LENGTH,
            names::REQUESTS_IN_FLIGHT,
        ]
    );
}

#[tokio::test]
async fn disabled_metrics_record_nothing() {
    let mut config = TelemetryConfig::default();
    config.metrics.enabled = false;
    let router = TestRouter::with_config(config, FakeTransport::employees());

    let response = router
        .call(graphql_request("query { employees { id } }"))
        .await;
    assert_eq!(response.status(), 200);

    let metrics = router.collect();
    assert!(metrics.metric(names::REQUESTS).is_none());
    assert!(metrics.metric(names::REQUESTS_IN_FLIGHT).is_none());
    assert_eq!(router.finished_spans().len(), 8);
}

/// Every data point as `(metric, attributes, value)`, with attributes sorted.
fn data_point_count(metrics: &ResourceMetrics, name: &str) -> usize {
    let metric = metrics
        .metric(name)
        .unwrap_or_else(|| panic!("metric '{name}' was not collected"));
    match &metric.data {
        AggregatedMetrics::U64(MetricData::Sum(sum)) => sum.data_points.len(),
        AggregatedMetrics::I64(MetricData::Sum(sum)) => sum.data_points.len(),
        AggregatedMetrics::F64(MetricData::Histogram(histogram)) => histogram.data_points.len(),
        other => panic!("unexpected aggregation for {name}: {other:?}"),
    }
}

fn flatten(metrics: &ResourceMetrics) -> Vec<(String, String, String)> {
    let mut points = Vec::new();
    for scope in &metrics.scope_metrics {
        for metric in &scope.metrics {
            let name = metric.name.to_string();
            match &metric.data {
                AggregatedMetrics::U64(MetricData::Sum(sum)) => {
                    for point in &sum.data_points {
                        points.push((name.clone(), sorted(&point.attributes), point.value.to_string()));
                    }
                }
                AggregatedMetrics::I64(MetricData::Sum(sum)) => {
                    for point in &sum.data_points {
                        points.push((name.clone(), sorted(&point.attributes), point.value.to_string()));
                    }
                }
                AggregatedMetrics::F64(MetricData::Histogram(histogram)) => {
                    for point in &histogram.data_points {
                        points.push((
                            name.clone(),
                            sorted(&point.attributes),
                            format!("{}/{:?}", point.count, point.bucket_counts),
                        ));
                    }
                }
                other => panic!("unexpected aggregation for {name}: {other:?}"),
            }
        }
    }
    points.sort();
    points
}

fn sorted(attributes: &[opentelemetry::KeyValue]) -> String {
    let mut pairs = attributes
        .iter()
        .map(|kv| format!("{}={}", kv.key, kv.value))
        .collect::<Vec<_>>();
    pairs.sort();
    pairs.join(",")
}
