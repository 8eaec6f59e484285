mod env_overrides;
pub mod graph;
pub mod log;
pub mod telemetry;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::{
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    graph::GraphConfig,
    log::LoggingConfig,
    telemetry::TelemetryConfig,
};

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// The router logger configuration.
    ///
    /// The router is configured to be mostly silent (`info`) level, and will print only important messages, warnings, and errors.
    #[serde(default)]
    pub log: LoggingConfig,

    /// Identity of the federated graph served by this router instance.
    ///
    /// These values end up on every router-scope metric data point.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Tracing and metrics configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum RouterConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "router.config.yaml",
    "router.config.yml",
    "router.config.json",
];

pub fn load_config(override_config_path: Option<String>) -> Result<RouterConfig, RouterConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<std::path::PathBuf>()
            .map_err(RouterConfigError::ConfigPathParseError)?;
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    Ok(config.build()?.try_deserialize::<RouterConfig>()?)
}

pub fn parse_yaml_config(config_raw: &str) -> Result<RouterConfig, RouterConfigError> {
    Config::builder()
        .add_source(File::from_str(config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<RouterConfig>()
        .map_err(RouterConfigError::ConfigLoadError)
}
