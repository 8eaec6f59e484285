pub mod stdout;
pub mod utils;

use cosmo_router_config::log::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;

use crate::logging::{stdout::build_stdout_layer, utils::DynLayer};
use crate::telemetry::error::TelemetryError;

pub fn logging_layers_from_logger_config<S>(
    config: &LoggingConfig,
) -> Result<(Vec<DynLayer<S>>, Vec<WorkerGuard>), TelemetryError>
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
{
    let (layer, guard) = build_stdout_layer(config)?;

    Ok((vec![layer], vec![guard]))
}
