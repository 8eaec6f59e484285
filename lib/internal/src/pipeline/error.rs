use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to parse GraphQL request payload: {0}")]
    FailedToParseBody(serde_json::Error),
    #[error("Failed to parse GraphQL operation: {0}")]
    FailedToParseOperation(String),
    #[error("Failed to normalize GraphQL operation: {0}")]
    NormalizationError(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Failed to produce a plan: {0}")]
    PlannerError(String),
    #[error("Failed to resolve the response: {0}")]
    ResolveError(String),
    #[error("Request to subgraph '{subgraph}' failed: {source}")]
    SubgraphTransportError {
        subgraph: String,
        #[source]
        source: BoxError,
    },
    #[error("Subgraph '{subgraph}' responded with status code {status}")]
    SubgraphStatusError { subgraph: String, status: u16 },
}

impl PipelineError {
    pub fn graphql_error_code(&self) -> &'static str {
        match self {
            Self::FailedToParseBody(_) => "BAD_REQUEST",
            Self::FailedToParseOperation(_) => "GRAPHQL_PARSE_FAILED",
            Self::NormalizationError(_) => "OPERATION_RESOLUTION_FAILURE",
            Self::ValidationError(_) => "GRAPHQL_VALIDATION_FAILED",
            Self::PlannerError(_) => "QUERY_PLAN_BUILD_FAILED",
            Self::ResolveError(_) => "QUERY_PLAN_EXECUTION_FAILED",
            Self::SubgraphTransportError { .. } | Self::SubgraphStatusError { .. } => {
                "SUBGRAPH_REQUEST_FAILED"
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::FailedToParseBody(_)
            | Self::FailedToParseOperation(_)
            | Self::NormalizationError(_)
            | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::PlannerError(_) | Self::ResolveError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SubgraphTransportError { .. } | Self::SubgraphStatusError { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    pub fn graphql_error_message(&self) -> String {
        match self {
            Self::PlannerError(_) => "Unexpected error".to_string(),
            _ => self.to_string(),
        }
    }

    /// `{"errors":[{"message":…,"extensions":{"code":…}}]}`
    pub fn to_response_body(&self) -> Vec<u8> {
        let result = FailedExecutionResult {
            errors: vec![GraphQLError {
                message: self.graphql_error_message(),
                extensions: GraphQLErrorExtensions {
                    code: self.graphql_error_code().to_string(),
                },
            }],
        };

        serde_json::to_vec(&result).unwrap_or_else(|_| br#"{"errors":[]}"#.to_vec())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FailedExecutionResult {
    pub errors: Vec<GraphQLError>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphQLError {
    pub message: String,
    pub extensions: GraphQLErrorExtensions,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphQLErrorExtensions {
    pub code: String,
}
