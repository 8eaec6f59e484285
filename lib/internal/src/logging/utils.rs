use tracing_subscriber::{EnvFilter, Layer};

use crate::telemetry::error::TelemetryError;

pub fn create_env_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|err| {
        TelemetryError::LoggingSetup(format!("invalid log filter '{directives}': {err}"))
    })
}

pub type DynLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;
