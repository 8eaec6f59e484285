use std::io::IsTerminal;

use cosmo_router_config::log::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::time::UtcTime, Layer};

use crate::logging::utils::{create_env_filter, DynLayer};
use crate::telemetry::error::TelemetryError;

pub fn build_stdout_layer<S>(
    config: &LoggingConfig,
) -> Result<(DynLayer<S>, WorkerGuard), TelemetryError>
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
{
    let filter = create_env_filter(config.env_filter_str())?;
    let stdout_stream = std::io::stdout();
    let is_terminal = stdout_stream.is_terminal();
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(stdout_stream);
    let timer = UtcTime::rfc_3339();

    let layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(stdout_writer)
            .json()
            .with_timer(timer)
            .with_thread_ids(false)
            .with_target(false)
            .with_ansi(false)
            .flatten_event(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::PrettyCompact => tracing_subscriber::fmt::layer()
            .with_writer(stdout_writer)
            .compact()
            .with_thread_ids(false)
            .with_timer(timer)
            .with_target(false)
            .with_ansi(is_terminal)
            .with_filter(filter)
            .boxed(),
        LogFormat::PrettyTree => tracing_tree::HierarchicalLayer::new(2)
            .with_writer(stdout_writer)
            .with_ansi(is_terminal)
            .with_bracketed_fields(true)
            .with_deferred_spans(false)
            .with_wraparound(25)
            .with_indent_lines(true)
            .with_timer(tracing_tree::time::Uptime::default())
            .with_thread_names(false)
            .with_thread_ids(false)
            .with_targets(false)
            .with_filter(filter)
            .boxed(),
    };

    Ok((layer, stdout_guard))
}
