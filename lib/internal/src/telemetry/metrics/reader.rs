use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::telemetry::error::TelemetryError;
use crate::telemetry::metrics::data::ResourceMetrics;
use crate::telemetry::metrics::provider::CumulativeMeterProvider;

/// Produces cumulative snapshots on demand.
///
/// Collecting never resets aggregation state, so two collections with no
/// measurements in between return the same values.
#[derive(Clone)]
pub struct ManualReader {
    provider: CumulativeMeterProvider,
    is_shutdown: Arc<AtomicBool>,
}

impl ManualReader {
    pub fn new(provider: &CumulativeMeterProvider) -> Self {
        Self {
            provider: provider.clone(),
            is_shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn collect(&self) -> Result<ResourceMetrics, TelemetryError> {
        if self.is_shutdown.load(Ordering::Acquire) {
            return Err(TelemetryError::ReaderShutdown);
        }

        Ok(self.provider.collect())
    }

    pub fn shutdown(&self) {
        self.is_shutdown.store(true, Ordering::Release);
    }
}
