//! The request pipeline, instrumented.
//!
//! Parsing, normalization, validation, planning and response resolution are
//! provided by an [`OperationProcessor`]. Subgraph calls go through a
//! [`SubgraphTransport`]. The pipeline only sequences them and reports every
//! lifecycle point to the request telemetry.
use async_trait::async_trait;
use bytes::Bytes;

use crate::graphql::{GraphQLRequest, OperationType};
use crate::telemetry::attributes::SubgraphIdentity;
use crate::BoxError;

pub mod error;
pub mod handler;

pub use error::PipelineError;
pub use handler::InstrumentedPipeline;

#[derive(Debug, Clone)]
pub struct ParsedOperation {
    pub operation_type: OperationType,
    pub name: Option<String>,
    pub document: String,
}

#[derive(Debug, Clone)]
pub struct NormalizedOperation {
    pub operation_type: OperationType,
    pub name: Option<String>,
    /// The normalized document. Its hash identifies the operation.
    pub document: String,
}

#[derive(Debug, Clone)]
pub struct FetchNode {
    pub subgraph: SubgraphIdentity,
    pub body: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    pub fetches: Vec<FetchNode>,
}

impl QueryPlan {
    /// The subgraph serving the whole operation, when the plan has a single fetch.
    pub fn single_subgraph(&self) -> Option<&SubgraphIdentity> {
        match self.fetches.as_slice() {
            [fetch] => Some(&fetch.subgraph),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubgraphResponse {
    pub status: u16,
    pub body: Bytes,
}

pub trait OperationProcessor: Send + Sync {
    fn parse(&self, request: &GraphQLRequest) -> Result<ParsedOperation, PipelineError>;

    fn normalize(&self, parsed: &ParsedOperation) -> Result<NormalizedOperation, PipelineError>;

    fn validate(&self, operation: &NormalizedOperation) -> Result<(), PipelineError>;

    fn plan(&self, operation: &NormalizedOperation) -> Result<QueryPlan, PipelineError>;

    /// Merges the subgraph responses, in plan order, into the response body.
    fn resolve(
        &self,
        operation: &NormalizedOperation,
        responses: Vec<SubgraphResponse>,
    ) -> Result<Bytes, PipelineError>;
}

#[async_trait]
pub trait SubgraphTransport: Send + Sync {
    async fn send(
        &self,
        subgraph: &SubgraphIdentity,
        body: Bytes,
    ) -> Result<SubgraphResponse, BoxError>;
}
