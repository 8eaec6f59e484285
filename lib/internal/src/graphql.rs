use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::EnumString)]
pub enum OperationType {
    #[strum(serialize = "query")]
    Query,
    #[strum(serialize = "mutation")]
    Mutation,
    #[strum(serialize = "subscription")]
    Subscription,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Transport the operation arrived over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::IntoStaticStr)]
pub enum OperationProtocol {
    #[default]
    #[strum(serialize = "http")]
    Http,
    #[strum(serialize = "ws")]
    Ws,
}

impl OperationProtocol {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Stable 64-bit hash of a normalized operation document.
pub fn operation_hash(normalized_document: &str) -> u64 {
    xxh3_64(normalized_document.as_bytes())
}

/// The body of a GraphQL-over-HTTP request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(rename = "operationName", default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

impl GraphQLRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
