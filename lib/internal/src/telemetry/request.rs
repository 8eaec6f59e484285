//! Per-request telemetry: the root span, the phase spans and the metric
//! recordings of one request, driven by the pipeline at its lifecycle points.
//!
//! Everything is released on drop. A request that is cancelled or returns
//! early still closes its spans and gives back its in-flight counts.
use tracing::Span;

use crate::graphql::{OperationProtocol, OperationType};
use crate::telemetry::attributes::{
    ClientInfo, OperationIdentity, RequestAttributes, SubgraphIdentity,
};
use crate::telemetry::metrics::http_client_metrics::HttpClientRequestState;
use crate::telemetry::metrics::http_server_metrics::HttpServerRequestState;
use crate::telemetry::metrics::Capture;
use crate::telemetry::traces::spans::operation::{
    EngineFetchSpan, OperationExecuteSpan, OperationNormalizeSpan, OperationParseSpan,
    OperationPlanSpan, OperationRootSpan, OperationValidateSpan, RecordSpanStatus,
    SubgraphTransportSpan, UNRESOLVED_OPERATION_SPAN_NAME,
};
use crate::telemetry::RouterTelemetry;

pub struct RequestTelemetry<'a> {
    telemetry: &'a RouterTelemetry,
    client: ClientInfo,
    protocol: OperationProtocol,
    operation: Option<OperationIdentity>,
    attributes: RequestAttributes,
    metrics: Capture<HttpServerRequestState<'a>>,
    root: OperationRootSpan,
}

impl<'a> RequestTelemetry<'a> {
    pub(crate) fn new(
        telemetry: &'a RouterTelemetry,
        client: ClientInfo,
        protocol: OperationProtocol,
        request_content_length: u64,
    ) -> Self {
        let attributes = telemetry
            .resolver()
            .unresolved_request_scope(&client, protocol);
        let metrics = telemetry
            .metrics()
            .http_server
            .capture_request(attributes.clone(), request_content_length);
        let root = OperationRootSpan::new(&client);

        Self {
            telemetry,
            client,
            protocol,
            operation: None,
            attributes,
            metrics,
            root,
        }
    }

    pub fn root_span(&self) -> &Span {
        &self.root
    }

    pub fn client(&self) -> &ClientInfo {
        &self.client
    }

    pub fn protocol(&self) -> OperationProtocol {
        self.protocol
    }

    pub fn operation(&self) -> Option<&OperationIdentity> {
        self.operation.as_ref()
    }

    pub fn parse_span(&self) -> OperationParseSpan {
        OperationParseSpan::new(&self.root)
    }

    pub fn normalize_span(&self) -> OperationNormalizeSpan {
        OperationNormalizeSpan::new(&self.root)
    }

    pub fn validate_span(&self) -> OperationValidateSpan {
        OperationValidateSpan::new(&self.root)
    }

    pub fn plan_span(&self) -> OperationPlanSpan {
        OperationPlanSpan::new(&self.root)
    }

    pub fn execute_span(&self) -> OperationExecuteSpan {
        OperationExecuteSpan::new(&self.root)
    }

    pub fn record_parsed_operation(&self, operation_type: OperationType, name: Option<&str>) {
        self.root.record_parsed_operation(operation_type, name);
    }

    /// The operation is normalized: request scope metrics now carry its identity.
    pub fn record_operation(&mut self, operation: OperationIdentity) {
        let attributes = self
            .telemetry
            .resolver()
            .request_scope(&self.client, &operation);

        self.root.record_operation(&operation);
        self.metrics.operation_resolved(attributes.clone());
        self.attributes = attributes;
        self.operation = Some(operation);
    }

    /// Opens the fetch span under `parent`, and the transport span inside it.
    pub fn subgraph_fetch(
        &self,
        parent: &Span,
        subgraph: &SubgraphIdentity,
        request_content_length: u64,
    ) -> SubgraphFetchTelemetry<'a> {
        let span_name = self
            .operation
            .as_ref()
            .map(OperationIdentity::span_name)
            .unwrap_or_else(|| UNRESOLVED_OPERATION_SPAN_NAME.to_string());

        let fetch = EngineFetchSpan::new(parent, subgraph);
        let transport =
            SubgraphTransportSpan::new(&fetch, &span_name, subgraph, request_content_length);
        let metrics = self.telemetry.metrics().http_client.capture_request(
            self.attributes.for_subgraph(subgraph),
            request_content_length,
        );

        SubgraphFetchTelemetry {
            transport,
            fetch,
            metrics,
        }
    }

    /// Records the request totals and closes the root span.
    ///
    /// `served_by` is the subgraph that served the whole operation, if there was exactly one.
    pub fn finish(
        self,
        status_code: u16,
        response_content_length: u64,
        served_by: Option<&SubgraphIdentity>,
    ) {
        self.root.record_status_code(status_code);
        self.metrics
            .finish(status_code, response_content_length, served_by);
    }
}

/// Telemetry of one subgraph call. The transport span closes before the fetch span.
pub struct SubgraphFetchTelemetry<'a> {
    transport: SubgraphTransportSpan,
    fetch: EngineFetchSpan,
    metrics: Capture<HttpClientRequestState<'a>>,
}

impl SubgraphFetchTelemetry<'_> {
    pub fn transport_span(&self) -> &Span {
        &self.transport
    }

    pub fn fetch_span(&self) -> &Span {
        &self.fetch
    }

    pub fn record_response(&self, status_code: u16, response_content_length: u64) {
        self.transport
            .record_response(status_code, response_content_length);
    }

    /// The call never produced a response.
    pub fn record_transport_error(&self, description: &str) {
        self.transport.record_error(description);
    }

    pub fn finish(self) {
        let Self {
            transport,
            fetch,
            metrics,
        } = self;

        metrics.finish();
        drop(transport);
        drop(fetch);
    }
}
