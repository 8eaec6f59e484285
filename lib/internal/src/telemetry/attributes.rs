//! Attributes attached to router metrics, resolved at three granularities.
//!
//! - router scope: identity of the deployment, fixed at startup.
//! - request scope: router scope plus client identity and operation identity.
//! - subgraph scope: request scope plus the subgraph that served a fetch.
//!
//! The router scope is built once and shared. Request scope attributes are
//! built once per request and reused for every data point of that request.
use std::sync::Arc;

use cosmo_router_config::graph::GraphConfig;
use cosmo_router_config::telemetry::{ClientHeadersConfig, TelemetryConfig};
use http::HeaderMap;
use opentelemetry::KeyValue;

use crate::graphql::{OperationProtocol, OperationType};

pub mod keys {
    pub const WG_ROUTER_VERSION: &str = "wg.router.version";
    pub const WG_ROUTER_CLUSTER_NAME: &str = "wg.router.cluster.name";
    pub const WG_ROUTER_CONFIG_VERSION: &str = "wg.router.config.version";
    pub const WG_FEDERATED_GRAPH_ID: &str = "wg.federated_graph.id";
    pub const WG_CLIENT_NAME: &str = "wg.client.name";
    pub const WG_CLIENT_VERSION: &str = "wg.client.version";
    pub const WG_OPERATION_HASH: &str = "wg.operation.hash";
    pub const WG_OPERATION_NAME: &str = "wg.operation.name";
    pub const WG_OPERATION_TYPE: &str = "wg.operation.type";
    pub const WG_OPERATION_PROTOCOL: &str = "wg.operation.protocol";
    pub const WG_SUBGRAPH_ID: &str = "wg.subgraph.id";
    pub const WG_SUBGRAPH_NAME: &str = "wg.subgraph.name";
    pub const HTTP_STATUS_CODE: &str = "http.status_code";
}

pub mod defaults {
    pub const CLIENT_NAME: &str = "unknown";
    pub const CLIENT_VERSION: &str = "missing";
    pub const UNNAMED_OPERATION: &str = "unnamed";
}

/// Read access to the request the attributes are resolved for.
pub trait RequestContext {
    fn header(&self, name: &str) -> Option<&str>;
}

impl RequestContext for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: defaults::CLIENT_NAME.to_string(),
            version: defaults::CLIENT_VERSION.to_string(),
        }
    }
}

/// What the router knows about an operation once it is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationIdentity {
    pub operation_type: OperationType,
    pub name: Option<String>,
    /// Hash of the normalized document.
    pub hash: u64,
    pub protocol: OperationProtocol,
}

impl OperationIdentity {
    /// `"<type> <name>"`, or `"<type> unnamed"` for anonymous operations.
    pub fn span_name(&self) -> String {
        operation_span_name(self.operation_type, self.name.as_deref())
    }
}

pub fn operation_span_name(operation_type: OperationType, name: Option<&str>) -> String {
    format!(
        "{} {}",
        operation_type.as_str(),
        name.filter(|name| !name.is_empty())
            .unwrap_or(defaults::UNNAMED_OPERATION)
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubgraphIdentity {
    pub id: String,
    pub name: String,
}

impl SubgraphIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Deployment identity reported on every data point.
#[derive(Debug, Clone, Default)]
pub struct RouterAttributes {
    pub federated_graph_id: String,
    pub cluster_name: String,
    pub config_version: String,
    pub router_version: String,
}

impl RouterAttributes {
    pub fn from_config(graph: &GraphConfig, telemetry: &TelemetryConfig) -> Self {
        Self {
            federated_graph_id: graph.id.clone(),
            cluster_name: graph.cluster_name.clone(),
            config_version: graph.config_version.clone(),
            router_version: telemetry.router_version.clone(),
        }
    }

    fn key_values(&self) -> Vec<KeyValue> {
        vec![
            KeyValue::new(keys::WG_ROUTER_CLUSTER_NAME, self.cluster_name.clone()),
            KeyValue::new(keys::WG_FEDERATED_GRAPH_ID, self.federated_graph_id.clone()),
            KeyValue::new(keys::WG_ROUTER_CONFIG_VERSION, self.config_version.clone()),
            KeyValue::new(keys::WG_ROUTER_VERSION, self.router_version.clone()),
        ]
    }
}

/// Request scope attributes, shared by every data point of a request.
#[derive(Debug, Clone)]
pub struct RequestAttributes {
    attributes: Arc<[KeyValue]>,
}

impl RequestAttributes {
    pub fn as_slice(&self) -> &[KeyValue] {
        &self.attributes
    }

    pub fn shared(&self) -> Arc<[KeyValue]> {
        self.attributes.clone()
    }

    pub fn with_status(&self, status_code: u16) -> Vec<KeyValue> {
        let mut attributes = Vec::with_capacity(self.attributes.len() + 1);
        attributes.extend_from_slice(&self.attributes);
        attributes.push(status_attribute(status_code));
        attributes
    }

    /// Subgraph scope.
    pub fn for_subgraph(&self, subgraph: &SubgraphIdentity) -> Vec<KeyValue> {
        let mut attributes = Vec::with_capacity(self.attributes.len() + 2);
        attributes.extend_from_slice(&self.attributes);
        attributes.extend(subgraph_attributes(subgraph));
        attributes
    }

    pub fn for_subgraph_with_status(
        &self,
        subgraph: &SubgraphIdentity,
        status_code: u16,
    ) -> Vec<KeyValue> {
        let mut attributes = self.with_status(status_code);
        attributes.extend(subgraph_attributes(subgraph));
        attributes
    }
}

fn status_attribute(status_code: u16) -> KeyValue {
    KeyValue::new(keys::HTTP_STATUS_CODE, i64::from(status_code))
}

fn subgraph_attributes(subgraph: &SubgraphIdentity) -> [KeyValue; 2] {
    [
        KeyValue::new(keys::WG_SUBGRAPH_ID, subgraph.id.clone()),
        KeyValue::new(keys::WG_SUBGRAPH_NAME, subgraph.name.clone()),
    ]
}

/// Resolves the attribute sets attached to router metrics.
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    router: Arc<[KeyValue]>,
    client_name_headers: Vec<String>,
    client_version_headers: Vec<String>,
}

impl AttributeResolver {
    pub fn new(router: &RouterAttributes, client_headers: &ClientHeadersConfig) -> Self {
        Self {
            router: router.key_values().into(),
            client_name_headers: client_headers.name.clone(),
            client_version_headers: client_headers.version.clone(),
        }
    }

    pub fn router_scope(&self) -> Arc<[KeyValue]> {
        self.router.clone()
    }

    /// Reads the client identity from the first configured header with a non-empty value.
    pub fn resolve_client<C: RequestContext + ?Sized>(&self, context: &C) -> ClientInfo {
        ClientInfo {
            name: first_header(context, &self.client_name_headers)
                .unwrap_or(defaults::CLIENT_NAME)
                .to_string(),
            version: first_header(context, &self.client_version_headers)
                .unwrap_or(defaults::CLIENT_VERSION)
                .to_string(),
        }
    }

    pub fn request_scope(
        &self,
        client: &ClientInfo,
        operation: &OperationIdentity,
    ) -> RequestAttributes {
        self.build_request_scope(
            client,
            operation.protocol,
            operation.hash.to_string(),
            operation.name.clone().unwrap_or_default(),
            operation.operation_type.as_str(),
        )
    }

    /// Request scope for a request that failed before its operation was identified.
    ///
    /// Operation hash, name and type are empty.
    pub fn unresolved_request_scope(
        &self,
        client: &ClientInfo,
        protocol: OperationProtocol,
    ) -> RequestAttributes {
        self.build_request_scope(client, protocol, String::new(), String::new(), "")
    }

    fn build_request_scope(
        &self,
        client: &ClientInfo,
        protocol: OperationProtocol,
        hash: String,
        name: String,
        operation_type: &'static str,
    ) -> RequestAttributes {
        let mut attributes = Vec::with_capacity(self.router.len() + 6);
        attributes.extend_from_slice(&self.router);
        attributes.extend([
            KeyValue::new(keys::WG_CLIENT_NAME, client.name.clone()),
            KeyValue::new(keys::WG_CLIENT_VERSION, client.version.clone()),
            KeyValue::new(keys::WG_OPERATION_HASH, hash),
            KeyValue::new(keys::WG_OPERATION_NAME, name),
            KeyValue::new(keys::WG_OPERATION_PROTOCOL, protocol.as_str()),
            KeyValue::new(keys::WG_OPERATION_TYPE, operation_type),
        ]);

        RequestAttributes {
            attributes: attributes.into(),
        }
    }
}

fn first_header<'a, C: RequestContext + ?Sized>(
    context: &'a C,
    names: &[String],
) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| context.header(name))
        .find(|value| !value.is_empty())
}
