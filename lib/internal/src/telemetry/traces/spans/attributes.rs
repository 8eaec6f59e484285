/// Span fields `tracing-opentelemetry` maps onto the OpenTelemetry span
pub const OTEL_NAME: &str = "otel.name";
pub const OTEL_KIND: &str = "otel.kind";
pub const OTEL_STATUS_CODE: &str = "otel.status_code";
pub const OTEL_STATUS_MESSAGE: &str = "otel.status_message";

/// Router attributes, shared with the metric dimensions
pub const WG_CLIENT_NAME: &str = "wg.client.name";
pub const WG_CLIENT_VERSION: &str = "wg.client.version";
pub const WG_OPERATION_NAME: &str = "wg.operation.name";
pub const WG_OPERATION_TYPE: &str = "wg.operation.type";
pub const WG_OPERATION_HASH: &str = "wg.operation.hash";
pub const WG_OPERATION_PROTOCOL: &str = "wg.operation.protocol";
pub const WG_SUBGRAPH_ID: &str = "wg.subgraph.id";
pub const WG_SUBGRAPH_NAME: &str = "wg.subgraph.name";

/// HTTP attributes
pub const HTTP_STATUS_CODE: &str = "http.status_code";
pub const HTTP_REQUEST_CONTENT_LENGTH: &str = "http.request_content_length";
pub const HTTP_RESPONSE_CONTENT_LENGTH: &str = "http.response_content_length";
