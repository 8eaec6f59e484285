use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct TracingConfig {
    /// Default: `true`.
    #[serde(default = "default_tracing_enabled")]
    pub enabled: bool,
    /// Where finished spans are sent.
    #[serde(default)]
    pub exporter: SpanExporterKind,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: default_tracing_enabled(),
            exporter: SpanExporterKind::default(),
        }
    }
}

fn default_tracing_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanExporterKind {
    /// Writes every finished span to stdout.
    #[default]
    Stdout,
    /// Drops finished spans.
    None,
}
