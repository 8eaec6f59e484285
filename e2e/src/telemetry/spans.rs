use opentelemetry::trace::SpanKind;
use opentelemetry::Value;

use crate::testkit::subgraphs::FakeTransport;
use crate::testkit::{
    assert_single_trace, find_span, graphql_request, graphql_request_with_headers, span_summary,
    SpanDataExt, TestRouter,
};

#[tokio::test]
async fn unnamed_query_spans() {
    let router = TestRouter::new(FakeTransport::employees());

    let response = router
        .call(graphql_request("query { employees { id } }"))
        .await;
    assert_eq!(response.status(), 200);

    let spans = router.finished_spans();
    insta::assert_snapshot!(span_summary(&spans), @r"
    Operation - Parse [Internal] Unset
    Operation - Normalize [Internal] Unset
    Operation - Validate [Internal] Unset
    Operation - Plan [Internal] Unset
    query unnamed [Client] Unset
    Engine - Fetch [Internal] Unset
    Operation - Execute [Internal] Unset
    query unnamed [Server] Unset
    ");

    assert_eq!(spans.len(), 8);
    assert_single_trace(&spans);
}

#[tokio::test]
async fn named_query_spans() {
    let router = TestRouter::new(FakeTransport::employees());

    router
        .call(graphql_request("query myQuery { employees { id } }"))
        .await;

    let spans = router.finished_spans();
    insta::assert_snapshot!(span_summary(&spans), @r"
    Operation - Parse [Internal] Unset
    Operation - Normalize [Internal] Unset
    Operation - Validate [Internal] Unset
    Operation - Plan [Internal] Unset
    query myQuery [Client] Unset
    Engine - Fetch [Internal] Unset
    Operation - Execute [Internal] Unset
    query myQuery [Server] Unset
    ");

    let root = spans.last().expect("root span");
    assert_eq!(
        root.attribute("wg.operation.name"),
        Some(&Value::from("myQuery"))
    );
}

#[tokio::test]
async fn spans_form_one_tree() {
    let router = TestRouter::new(FakeTransport::employees());
    router
        .call(graphql_request("query { employees { id } }"))
        .await;

    let spans = router.finished_spans();
    let root = spans.last().expect("root span");
    assert_eq!(root.span_kind, SpanKind::Server);
    assert!(root.parent_id().is_none());

    for phase in [
        "Operation - Parse",
        "Operation - Normalize",
        "Operation - Validate",
        "Operation - Plan",
        "Operation - Execute",
    ] {
        assert_eq!(
            find_span(&spans, phase).parent_id(),
            Some(root.id()),
            "{phase} should be a child of the root span"
        );
    }

    let execute = find_span(&spans, "Operation - Execute");
    let fetch = find_span(&spans, "Engine - Fetch");
    assert_eq!(fetch.parent_id(), Some(execute.id()));

    let transport = spans
        .iter()
        .find(|span| span.span_kind == SpanKind::Client)
        .expect("transport span");
    assert_eq!(transport.parent_id(), Some(fetch.id()));

    for span in &spans {
        assert!(span.end_time >= span.start_time);
    }
}

#[tokio::test]
async fn root_span_carries_request_identity() {
    let router = TestRouter::new(FakeTransport::employees());
    router
        .call(graphql_request_with_headers(
            "query { employees { id } }",
            &[
                ("graphql-client-name", "web"),
                ("graphql-client-version", "1.4.0"),
            ],
        ))
        .await;

    let spans = router.finished_spans();
    let root = spans.last().expect("root span");
    assert_eq!(root.attribute("wg.client.name"), Some(&Value::from("web")));
    assert_eq!(
        root.attribute("wg.client.version"),
        Some(&Value::from("1.4.0"))
    );
    assert_eq!(
        root.attribute("wg.operation.type"),
        Some(&Value::from("query"))
    );
    assert_eq!(
        root.attribute("wg.operation.protocol"),
        Some(&Value::from("http"))
    );
    assert_eq!(root.attribute("http.status_code"), Some(&Value::I64(200)));
    assert!(root.attribute("wg.operation.hash").is_some());
}

#[tokio::test]
async fn transport_span_carries_subgraph_call() {
    let router = TestRouter::new(FakeTransport::employees());
    router
        .call(graphql_request("query { employees { id } }"))
        .await;

    let spans = router.finished_spans();
    let transport = spans
        .iter()
        .find(|span| span.span_kind == SpanKind::Client)
        .expect("transport span");

    assert_eq!(transport.attribute("wg.subgraph.id"), Some(&Value::from("0")));
    assert_eq!(
        transport.attribute("wg.subgraph.name"),
        Some(&Value::from("employees"))
    );
    assert_eq!(
        transport.attribute("http.request_content_length"),
        Some(&Value::I64(28))
    );
    assert_eq!(
        transport.attribute("http.response_content_length"),
        Some(&Value::I64(117))
    );
    assert_eq!(transport.attribute("http.status_code"), Some(&Value::I64(200)));
}
