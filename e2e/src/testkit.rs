use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use cosmo_router_config::graph::GraphConfig;
use cosmo_router_config::telemetry::TelemetryConfig;
use cosmo_router_internal::graphql::{operation_hash, OperationProtocol, OperationType};
use cosmo_router_internal::pipeline::InstrumentedPipeline;
use cosmo_router_internal::telemetry::attributes::{
    ClientInfo, OperationIdentity, RequestAttributes,
};
use cosmo_router_internal::telemetry::metrics::data::ResourceMetrics;
use cosmo_router_internal::telemetry::metrics::{CumulativeMeterProvider, ManualReader};
use cosmo_router_internal::telemetry::traces::router_span_layer;
use cosmo_router_internal::telemetry::{router_meter, RouterTelemetry};
use http::{Method, Request, Response};
use opentelemetry::trace::{SpanId, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

pub mod subgraphs;

use subgraphs::{FakeProcessor, FakeTransport};

/// A router pipeline wired to in-memory span and metric readers.
///
/// Every call runs under the router's own subscriber, so tests can run in parallel.
pub struct TestRouter {
    pipeline: InstrumentedPipeline<FakeProcessor, FakeTransport>,
    transport: FakeTransport,
    spans: InMemorySpanExporter,
    _tracer_provider: SdkTracerProvider,
    reader: ManualReader,
    dispatch: Dispatch,
}

impl TestRouter {
    pub fn new(transport: FakeTransport) -> Self {
        Self::with_config(TelemetryConfig::default(), transport)
    }

    pub fn with_config(config: TelemetryConfig, transport: FakeTransport) -> Self {
        let graph = GraphConfig {
            id: "employees-graph".to_string(),
            ..Default::default()
        };

        let provider = CumulativeMeterProvider::builder()
            .with_resource(vec![KeyValue::new(
                "service.name",
                config.service.name.clone(),
            )])
            .with_histogram_record_min_max(config.metrics.histogram.record_min_max)
            .build();
        let meter = router_meter(&provider);
        let telemetry = RouterTelemetry::from_config(&graph, &config, Some(&meter));
        let reader = ManualReader::new(&provider);

        let spans = InMemorySpanExporter::default();
        let tracer_provider = SdkTracerProvider::builder()
            .with_simple_exporter(spans.clone())
            .build();
        let dispatch = Dispatch::new(Registry::default().with(router_span_layer(&tracer_provider)));

        Self {
            pipeline: InstrumentedPipeline::new(
                Arc::new(telemetry),
                FakeProcessor,
                transport.clone(),
            ),
            transport,
            spans,
            _tracer_provider: tracer_provider,
            reader,
            dispatch,
        }
    }

    pub async fn call(&self, request: Request<Bytes>) -> Response<Bytes> {
        self.call_future(request).await
    }

    /// The request as a future that has not been polled yet.
    pub fn call_future(&self, request: Request<Bytes>) -> impl Future<Output = Response<Bytes>> + '_ {
        self.pipeline
            .handle(request)
            .with_subscriber(self.dispatch.clone())
    }

    pub fn transport(&self) -> &FakeTransport {
        &self.transport
    }

    /// Ended spans, in end order. A span shows up here as soon as it ends.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.spans
            .get_finished_spans()
            .expect("failed to read finished spans")
    }

    pub fn collect(&self) -> ResourceMetrics {
        self.reader.collect().expect("failed to collect metrics")
    }

    pub fn router_scope(&self) -> Vec<KeyValue> {
        self.pipeline.telemetry().resolver().router_scope().to_vec()
    }

    /// Request scope of a query for `{employees {id}}` over HTTP.
    pub fn employees_request_scope(
        &self,
        client: &ClientInfo,
        name: Option<&str>,
    ) -> RequestAttributes {
        self.pipeline.telemetry().resolver().request_scope(
            client,
            &OperationIdentity {
                operation_type: OperationType::Query,
                name: name.map(str::to_string),
                hash: operation_hash("{employees {id}}"),
                protocol: OperationProtocol::Http,
            },
        )
    }

    pub fn unresolved_request_scope(&self, client: &ClientInfo) -> RequestAttributes {
        self.pipeline
            .telemetry()
            .resolver()
            .unresolved_request_scope(client, OperationProtocol::Http)
    }
}

pub fn graphql_request(query: &str) -> Request<Bytes> {
    graphql_request_with_headers(query, &[])
}

pub fn graphql_request_with_headers(query: &str, headers: &[(&str, &str)]) -> Request<Bytes> {
    raw_request(
        serde_json::json!({ "query": query }).to_string(),
        headers,
    )
}

pub fn raw_request(body: impl Into<Bytes>, headers: &[(&str, &str)]) -> Request<Bytes> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body.into()).expect("failed to build request")
}

/// One line per span: `name [kind] status`.
pub fn span_summary(spans: &[SpanData]) -> String {
    spans
        .iter()
        .map(|span| {
            let status = match &span.status {
                Status::Unset => "Unset",
                Status::Ok => "Ok",
                Status::Error { .. } => "Error",
            };
            format!("{} [{:?}] {}", span.name, span.span_kind, status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub trait SpanDataExt {
    fn attribute(&self, key: &str) -> Option<&Value>;
    fn is_error(&self) -> bool;
    /// `None` for a root span.
    fn parent_id(&self) -> Option<SpanId>;
    fn id(&self) -> SpanId;
}

impl SpanDataExt for SpanData {
    fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    fn is_error(&self) -> bool {
        matches!(self.status, Status::Error { .. })
    }

    fn parent_id(&self) -> Option<SpanId> {
        (self.parent_span_id != SpanId::INVALID).then_some(self.parent_span_id)
    }

    fn id(&self) -> SpanId {
        self.span_context.span_id()
    }
}

/// Every span shares the trace of the first one.
pub fn assert_single_trace(spans: &[SpanData]) {
    let trace_id = spans[0].span_context.trace_id();
    assert!(spans
        .iter()
        .all(|span| span.span_context.trace_id() == trace_id));
}

pub fn find_span<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
    spans
        .iter()
        .find(|span| span.name == name)
        .unwrap_or_else(|| panic!("span '{name}' was not exported"))
}

pub fn counter_value(metrics: &ResourceMetrics, name: &str, attributes: &[KeyValue]) -> Option<u64> {
    metrics
        .metric(name)?
        .data
        .as_u64_sum()?
        .data_point(attributes)
        .map(|point| point.value)
}

pub fn up_down_value(metrics: &ResourceMetrics, name: &str, attributes: &[KeyValue]) -> Option<i64> {
    metrics
        .metric(name)?
        .data
        .as_i64_sum()?
        .data_point(attributes)
        .map(|point| point.value)
}

pub fn histogram_count(
    metrics: &ResourceMetrics,
    name: &str,
    attributes: &[KeyValue],
) -> Option<u64> {
    metrics
        .metric(name)?
        .data
        .as_f64_histogram()?
        .data_point(attributes)
        .map(|point| point.count)
}
