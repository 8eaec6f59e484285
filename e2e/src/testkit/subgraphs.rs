//! In-process stand-ins for the operation processor and the subgraphs.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cosmo_router_internal::graphql::{GraphQLRequest, OperationType};
use cosmo_router_internal::pipeline::{
    FetchNode, NormalizedOperation, OperationProcessor, ParsedOperation, PipelineError, QueryPlan,
    SubgraphResponse, SubgraphTransport,
};
use cosmo_router_internal::telemetry::attributes::SubgraphIdentity;
use cosmo_router_internal::BoxError;

/// The response of the employees subgraph to `{employees {id}}`.
pub const EMPLOYEES_RESPONSE: &str = r#"{"data":{"employees":[{"id":1},{"id":2},{"id":3},{"id":4},{"id":5},{"id":7},{"id":8},{"id":10},{"id":11},{"id":12}]}}"#;

/// A field every validation rejects.
pub const UNKNOWN_FIELD: &str = "unknownField";

pub fn employees_subgraph() -> SubgraphIdentity {
    SubgraphIdentity::new("0", "employees")
}

/// Understands just enough GraphQL to route single-subgraph operations
/// to the employees subgraph.
#[derive(Default)]
pub struct FakeProcessor;

impl OperationProcessor for FakeProcessor {
    fn parse(&self, request: &GraphQLRequest) -> Result<ParsedOperation, PipelineError> {
        let query = request.query.trim();
        let selection_start = query.find('{').ok_or_else(|| {
            PipelineError::FailedToParseOperation("expected a selection set".to_string())
        })?;

        let opening = query.matches('{').count();
        let closing = query.matches('}').count();
        if opening != closing {
            return Err(PipelineError::FailedToParseOperation(
                "unbalanced selection set".to_string(),
            ));
        }

        let mut header = query[..selection_start].split_whitespace();
        let operation_type = match header.next() {
            None => OperationType::Query,
            Some(keyword) => keyword.parse::<OperationType>().map_err(|_| {
                PipelineError::FailedToParseOperation(format!("unexpected token '{keyword}'"))
            })?,
        };
        let name = header
            .next()
            .map(|name| name.split('(').next().unwrap_or(name).to_string())
            .filter(|name| !name.is_empty());

        Ok(ParsedOperation {
            operation_type,
            name: request.operation_name.clone().or(name),
            document: query[selection_start..].to_string(),
        })
    }

    fn normalize(&self, parsed: &ParsedOperation) -> Result<NormalizedOperation, PipelineError> {
        let document = parsed
            .document
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .replace("{ ", "{")
            .replace(" }", "}");

        Ok(NormalizedOperation {
            operation_type: parsed.operation_type,
            name: parsed.name.clone(),
            document,
        })
    }

    fn validate(&self, operation: &NormalizedOperation) -> Result<(), PipelineError> {
        if operation.document.contains(UNKNOWN_FIELD) {
            return Err(PipelineError::ValidationError(format!(
                "Cannot query field \"{UNKNOWN_FIELD}\" on type \"Query\"."
            )));
        }
        Ok(())
    }

    fn plan(&self, operation: &NormalizedOperation) -> Result<QueryPlan, PipelineError> {
        let body = serde_json::json!({ "query": operation.document }).to_string();
        Ok(QueryPlan {
            fetches: vec![FetchNode {
                subgraph: employees_subgraph(),
                body: Bytes::from(body),
            }],
        })
    }

    fn resolve(
        &self,
        _operation: &NormalizedOperation,
        responses: Vec<SubgraphResponse>,
    ) -> Result<Bytes, PipelineError> {
        responses
            .into_iter()
            .next()
            .map(|response| response.body)
            .ok_or_else(|| PipelineError::ResolveError("no subgraph response".to_string()))
    }
}

#[derive(Clone)]
enum SubgraphBehavior {
    Respond { status: u16, body: Bytes },
    Fail(&'static str),
    Hang,
}

/// A subgraph transport with a fixed behavior. Clones share the call count.
#[derive(Clone)]
pub struct FakeTransport {
    behavior: SubgraphBehavior,
    calls: Arc<AtomicUsize>,
}

impl FakeTransport {
    fn new(behavior: SubgraphBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn employees() -> Self {
        Self::responding(200, EMPLOYEES_RESPONSE)
    }

    pub fn responding(status: u16, body: &'static str) -> Self {
        Self::new(SubgraphBehavior::Respond {
            status,
            body: Bytes::from_static(body.as_bytes()),
        })
    }

    /// Never produces a response.
    pub fn failing(message: &'static str) -> Self {
        Self::new(SubgraphBehavior::Fail(message))
    }

    /// Never completes.
    pub fn hanging() -> Self {
        Self::new(SubgraphBehavior::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubgraphTransport for FakeTransport {
    async fn send(
        &self,
        _subgraph: &SubgraphIdentity,
        _body: Bytes,
    ) -> Result<SubgraphResponse, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // let other requests interleave
        tokio::task::yield_now().await;

        match &self.behavior {
            SubgraphBehavior::Respond { status, body } => Ok(SubgraphResponse {
                status: *status,
                body: body.clone(),
            }),
            SubgraphBehavior::Fail(message) => Err((*message).into()),
            SubgraphBehavior::Hang => futures::future::pending().await,
        }
    }
}
