use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

use crate::log::{LogFormat, LogLevel};

#[derive(Envconfig)]
pub struct EnvVarOverrides {
    // Logger overrides
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,

    // Graph identity overrides
    #[envconfig(from = "FEDERATED_GRAPH_ID")]
    pub graph_id: Option<String>,
    #[envconfig(from = "CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    // Telemetry overrides
    #[envconfig(from = "METRICS_ENABLED")]
    pub metrics_enabled: Option<bool>,
    #[envconfig(from = "TRACING_ENABLED")]
    pub tracing_enabled: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {:?}", log_level);
            config = config.set_override("log.level", log_level.as_str())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {:?}", log_format);
            config = config.set_override("log.format", log_format.as_str())?;
        }
        if let Some(log_filter) = self.log_filter.take() {
            debug!("[config-override] 'log.filter' = {:?}", log_filter);
            config = config.set_override("log.filter", log_filter)?;
        }

        if let Some(graph_id) = self.graph_id.take() {
            debug!("[config-override] 'graph.id' = {}", graph_id);
            config = config.set_override("graph.id", graph_id)?;
        }
        if let Some(cluster_name) = self.cluster_name.take() {
            debug!("[config-override] 'graph.cluster_name' = {}", cluster_name);
            config = config.set_override("graph.cluster_name", cluster_name)?;
        }

        if let Some(enabled) = self.metrics_enabled.take() {
            config = config.set_override("telemetry.metrics.enabled", enabled)?;
        }
        if let Some(enabled) = self.tracing_enabled.take() {
            config = config.set_override("telemetry.tracing.enabled", enabled)?;
        }

        Ok(config)
    }
}
