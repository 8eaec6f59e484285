#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
    #[error("metric reader is shut down")]
    ReaderShutdown,
    #[error("unable to shut down the tracer provider: {0}")]
    TracerShutdown(String),
    #[error("unable to export metrics: {0}")]
    MetricsExport(String),
    #[error("unable to configure logging: {0}")]
    LoggingSetup(String),
}

impl From<String> for TelemetryError {
    fn from(s: String) -> Self {
        TelemetryError::Internal(s)
    }
}

impl From<&str> for TelemetryError {
    fn from(s: &str) -> Self {
        TelemetryError::Internal(s.to_string())
    }
}
