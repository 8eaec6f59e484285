use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use tracing::{debug, warn, Instrument, Span};

use crate::graphql::{operation_hash, GraphQLRequest, OperationProtocol};
use crate::pipeline::{
    FetchNode, OperationProcessor, PipelineError, QueryPlan, SubgraphResponse, SubgraphTransport,
};
use crate::telemetry::attributes::{OperationIdentity, SubgraphIdentity};
use crate::telemetry::request::RequestTelemetry;
use crate::telemetry::traces::spans::operation::RecordSpanStatus;
use crate::telemetry::RouterTelemetry;

pub struct InstrumentedPipeline<P, T> {
    telemetry: Arc<RouterTelemetry>,
    processor: P,
    transport: T,
}

struct Executed {
    body: Bytes,
    served_by: Option<SubgraphIdentity>,
}

impl<P, T> InstrumentedPipeline<P, T>
where
    P: OperationProcessor,
    T: SubgraphTransport,
{
    pub fn new(telemetry: Arc<RouterTelemetry>, processor: P, transport: T) -> Self {
        Self {
            telemetry,
            processor,
            transport,
        }
    }

    pub fn telemetry(&self) -> &RouterTelemetry {
        &self.telemetry
    }

    /// Runs one GraphQL-over-HTTP request. Failures become GraphQL error responses.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();
        let mut telemetry =
            self.telemetry
                .start_request(&parts.headers, OperationProtocol::Http, body.len() as u64);

        let (status, body, served_by) = match self.execute(&mut telemetry, &body).await {
            Ok(executed) => (StatusCode::OK, executed.body, executed.served_by),
            Err(err) => {
                warn!(error = %err, "request failed");
                (err.status_code(), Bytes::from(err.to_response_body()), None)
            }
        };

        telemetry.finish(status.as_u16(), body.len() as u64, served_by.as_ref());

        let mut response = Response::new(body);
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    async fn execute(
        &self,
        telemetry: &mut RequestTelemetry<'_>,
        body: &Bytes,
    ) -> Result<Executed, PipelineError> {
        let request = GraphQLRequest::from_slice(body).map_err(PipelineError::FailedToParseBody)?;

        let parsed = run_phase(&telemetry.parse_span(), || self.processor.parse(&request))?;
        telemetry.record_parsed_operation(parsed.operation_type, parsed.name.as_deref());

        let (normalized, hash) = {
            let normalize_span = telemetry.normalize_span();
            let normalized = run_phase(&normalize_span, || self.processor.normalize(&parsed))?;
            let hash = operation_hash(&normalized.document);
            normalize_span.record_operation_hash(hash);
            (normalized, hash)
        };

        let protocol = telemetry.protocol();
        telemetry.record_operation(OperationIdentity {
            operation_type: normalized.operation_type,
            name: normalized.name.clone(),
            hash,
            protocol,
        });

        run_phase(&telemetry.validate_span(), || self.processor.validate(&normalized))?;
        let plan = run_phase(&telemetry.plan_span(), || self.processor.plan(&normalized))?;
        debug!(fetches = plan.fetches.len(), "operation planned");

        let execute_span = telemetry.execute_span();
        // subgraph failures are reported on their transport spans
        let responses = self
            .execute_plan(telemetry, &execute_span, &plan)
            .instrument(execute_span.span.clone())
            .await?;

        let body = run_phase(&execute_span, || {
            self.processor.resolve(&normalized, responses)
        })?;

        Ok(Executed {
            body,
            served_by: plan.single_subgraph().cloned(),
        })
    }

    /// Issues every fetch of the plan concurrently. Responses come back in plan order.
    async fn execute_plan(
        &self,
        telemetry: &RequestTelemetry<'_>,
        parent: &Span,
        plan: &QueryPlan,
    ) -> Result<Vec<SubgraphResponse>, PipelineError> {
        join_all(
            plan.fetches
                .iter()
                .map(|node| self.fetch(telemetry, parent, node)),
        )
        .await
        .into_iter()
        .collect()
    }

    async fn fetch(
        &self,
        telemetry: &RequestTelemetry<'_>,
        parent: &Span,
        node: &FetchNode,
    ) -> Result<SubgraphResponse, PipelineError> {
        let fetch = telemetry.subgraph_fetch(parent, &node.subgraph, node.body.len() as u64);

        let result = self
            .transport
            .send(&node.subgraph, node.body.clone())
            .instrument(fetch.transport_span().clone())
            .await;

        let result = match result {
            Ok(response) => {
                fetch.record_response(response.status, response.body.len() as u64);
                if (200..300).contains(&response.status) {
                    Ok(response)
                } else {
                    Err(PipelineError::SubgraphStatusError {
                        subgraph: node.subgraph.name.clone(),
                        status: response.status,
                    })
                }
            }
            Err(source) => {
                fetch.record_transport_error(&source.to_string());
                Err(PipelineError::SubgraphTransportError {
                    subgraph: node.subgraph.name.clone(),
                    source,
                })
            }
        };

        fetch.finish();
        result
    }
}

/// Runs a phase inside its span. A failure marks that span, and only that span.
fn run_phase<S, R>(
    span: &S,
    phase: impl FnOnce() -> Result<R, PipelineError>,
) -> Result<R, PipelineError>
where
    S: RecordSpanStatus,
{
    let result = span.span().in_scope(phase);
    if let Err(err) = &result {
        span.record_error(&err.to_string());
    }
    result
}
