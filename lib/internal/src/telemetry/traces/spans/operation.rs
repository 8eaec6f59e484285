use tracing::{field::Empty, info_span, Span};

use crate::graphql::OperationType;
use crate::telemetry::attributes::{
    operation_span_name, ClientInfo, OperationIdentity, SubgraphIdentity,
};
use crate::telemetry::traces::spans::{attributes, TARGET_NAME};

/// Name of the root span until the operation is parsed.
pub const UNRESOLVED_OPERATION_SPAN_NAME: &str = "Operation";

/// Root span of a request. Every other router span of the request descends from it.
pub struct OperationRootSpan {
    pub span: Span,
}

impl std::ops::Deref for OperationRootSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl OperationRootSpan {
    pub fn new(client: &ClientInfo) -> Self {
        let span = info_span!(
            target: TARGET_NAME,
            "Operation",
            "otel.name" = Empty,
            "otel.kind" = "Server",
            "otel.status_code" = Empty,
            "otel.status_message" = Empty,
            "wg.client.name" = client.name.as_str(),
            "wg.client.version" = client.version.as_str(),
            "wg.operation.name" = Empty,
            "wg.operation.type" = Empty,
            "wg.operation.hash" = Empty,
            "wg.operation.protocol" = Empty,
            "http.status_code" = Empty,
        );
        OperationRootSpan { span }
    }

    /// Names the span `"<type> <name|unnamed>"` as soon as the document is parsed.
    pub fn record_parsed_operation(&self, operation_type: OperationType, name: Option<&str>) {
        let span_name = operation_span_name(operation_type, name);
        self.span.record(attributes::OTEL_NAME, span_name.as_str());
        self.span
            .record(attributes::WG_OPERATION_TYPE, operation_type.as_str());
        if let Some(name) = name {
            self.span.record(attributes::WG_OPERATION_NAME, name);
        }
    }

    pub fn record_operation(&self, operation: &OperationIdentity) {
        self.span
            .record(attributes::OTEL_NAME, operation.span_name().as_str());
        self.span
            .record(attributes::WG_OPERATION_HASH, operation.hash.to_string().as_str());
        self.span
            .record(attributes::WG_OPERATION_PROTOCOL, operation.protocol.as_str());
    }

    /// Server errors mark the root span as failed. Client errors leave it unset.
    pub fn record_status_code(&self, status_code: u16) {
        self.span
            .record(attributes::HTTP_STATUS_CODE, i64::from(status_code));
        if status_code >= 500 {
            self.record_error(&format!("request failed with status code {status_code}"));
        }
    }
}

#[derive(Clone)]
pub struct OperationParseSpan {
    pub span: Span,
}

impl std::ops::Deref for OperationParseSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl OperationParseSpan {
    pub fn new(parent: &Span) -> Self {
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "Operation - Parse",
            "otel.kind" = "Internal",
            "otel.status_code" = Empty,
            "otel.status_message" = Empty,
        );
        OperationParseSpan { span }
    }
}

#[derive(Clone)]
pub struct OperationNormalizeSpan {
    pub span: Span,
}

impl std::ops::Deref for OperationNormalizeSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl OperationNormalizeSpan {
    pub fn new(parent: &Span) -> Self {
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "Operation - Normalize",
            "otel.kind" = "Internal",
            "otel.status_code" = Empty,
            "otel.status_message" = Empty,
            "wg.operation.hash" = Empty,
        );
        OperationNormalizeSpan { span }
    }

    pub fn record_operation_hash(&self, hash: u64) {
        self.span
            .record(attributes::WG_OPERATION_HASH, hash.to_string().as_str());
    }
}

#[derive(Clone)]
pub struct OperationValidateSpan {
    pub span: Span,
}

impl std::ops::Deref for OperationValidateSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl OperationValidateSpan {
    pub fn new(parent: &Span) -> Self {
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "Operation - Validate",
            "otel.kind" = "Internal",
            "otel.status_code" = Empty,
            "otel.status_message" = Empty,
        );
        OperationValidateSpan { span }
    }
}

#[derive(Clone)]
pub struct OperationPlanSpan {
    pub span: Span,
}

impl std::ops::Deref for OperationPlanSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl OperationPlanSpan {
    pub fn new(parent: &Span) -> Self {
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "Operation - Plan",
            "otel.kind" = "Internal",
            "otel.status_code" = Empty,
            "otel.status_message" = Empty,
        );
        OperationPlanSpan { span }
    }
}

/// Wraps the whole engine invocation, every subgraph fetch included.
#[derive(Clone)]
pub struct OperationExecuteSpan {
    pub span: Span,
}

impl std::ops::Deref for OperationExecuteSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl OperationExecuteSpan {
    pub fn new(parent: &Span) -> Self {
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "Operation - Execute",
            "otel.kind" = "Internal",
            "otel.status_code" = Empty,
            "otel.status_message" = Empty,
        );
        OperationExecuteSpan { span }
    }
}

/// Loader bookkeeping around one subgraph call.
pub struct EngineFetchSpan {
    pub span: Span,
}

impl std::ops::Deref for EngineFetchSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl EngineFetchSpan {
    pub fn new(parent: &Span, subgraph: &SubgraphIdentity) -> Self {
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "Engine - Fetch",
            "otel.kind" = "Internal",
            "otel.status_code" = Empty,
            "otel.status_message" = Empty,
            "wg.subgraph.id" = subgraph.id.as_str(),
            "wg.subgraph.name" = subgraph.name.as_str(),
        );
        EngineFetchSpan { span }
    }
}

/// The outbound call to a subgraph, named after the operation it serves.
pub struct SubgraphTransportSpan {
    pub span: Span,
}

impl std::ops::Deref for SubgraphTransportSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl SubgraphTransportSpan {
    pub fn new(
        parent: &Span,
        operation_span_name: &str,
        subgraph: &SubgraphIdentity,
        request_content_length: u64,
    ) -> Self {
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "Subgraph Request",
            "otel.name" = operation_span_name,
            "otel.kind" = "Client",
            "otel.status_code" = Empty,
            "otel.status_message" = Empty,
            "wg.subgraph.id" = subgraph.id.as_str(),
            "wg.subgraph.name" = subgraph.name.as_str(),
            "http.request_content_length" = request_content_length,
            "http.status_code" = Empty,
            "http.response_content_length" = Empty,
        );
        SubgraphTransportSpan { span }
    }

    pub fn record_response(&self, status_code: u16, response_content_length: u64) {
        self.span
            .record(attributes::HTTP_STATUS_CODE, i64::from(status_code));
        self.span
            .record(attributes::HTTP_RESPONSE_CONTENT_LENGTH, response_content_length);
        if status_code >= 500 {
            self.record_error(&format!("subgraph responded with status code {status_code}"));
        }
    }
}

pub trait RecordSpanStatus {
    fn span(&self) -> &Span;

    /// Marks this span, and only this span, as failed.
    fn record_error(&self, description: &str) {
        self.span().record(attributes::OTEL_STATUS_CODE, "Error");
        self.span()
            .record(attributes::OTEL_STATUS_MESSAGE, description);
    }

    /// Ends the span, failed when `error` is set.
    fn end(self, error: Option<&str>)
    where
        Self: Sized,
    {
        if let Some(description) = error {
            self.record_error(description);
        }
    }
}

// Implement RecordSpanStatus for all span types, using a macro
// to reduce boilerplate.
macro_rules! impl_record_span_status {
    ($($span_type:ty),*) => {
        $(
            impl RecordSpanStatus for $span_type {
                fn span(&self) -> &Span {
                    &self.span
                }
            }
        )*
    };
}

impl_record_span_status!(
    OperationRootSpan,
    OperationParseSpan,
    OperationNormalizeSpan,
    OperationValidateSpan,
    OperationPlanSpan,
    OperationExecuteSpan,
    EngineFetchSpan,
    SubgraphTransportSpan
);
