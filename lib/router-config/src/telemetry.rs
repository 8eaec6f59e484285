use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::telemetry::{metrics::MetricsConfig, tracing::TracingConfig};

pub mod metrics;
pub mod tracing;

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    /// Version reported as `wg.router.version`.
    #[serde(default = "default_router_version")]
    pub router_version: String,
    /// Headers used to identify the client that sent the request.
    #[serde(default)]
    pub client_headers: ClientHeadersConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            router_version: default_router_version(),
            client_headers: ClientHeadersConfig::default(),
            tracing: TracingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl TelemetryConfig {
    pub fn is_tracing_enabled(&self) -> bool {
        self.tracing.enabled
    }

    pub fn is_metrics_enabled(&self) -> bool {
        self.metrics.enabled
    }
}

fn default_router_version() -> String {
    "dev".to_string()
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

fn default_service_name() -> String {
    "cosmo-router".to_string()
}

/// Header names looked up, in order, to resolve the client identity.
///
/// The first header with a non-empty value wins.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct ClientHeadersConfig {
    #[serde(default = "default_client_name_headers")]
    pub name: Vec<String>,
    #[serde(default = "default_client_version_headers")]
    pub version: Vec<String>,
}

impl Default for ClientHeadersConfig {
    fn default() -> Self {
        Self {
            name: default_client_name_headers(),
            version: default_client_version_headers(),
        }
    }
}

fn default_client_name_headers() -> Vec<String> {
    vec![
        "graphql-client-name".to_string(),
        "apollographql-client-name".to_string(),
    ]
}

fn default_client_version_headers() -> Vec<String> {
    vec![
        "graphql-client-version".to_string(),
        "apollographql-client-version".to_string(),
    ]
}
