use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::telemetry::error::TelemetryError;
use crate::telemetry::metrics::exporter::PushMetricExporter;
use crate::telemetry::metrics::reader::ManualReader;

/// Collects on a fixed interval and pushes every snapshot to an exporter.
///
/// A final snapshot is pushed when the reader shuts down.
pub struct PeriodicReader {
    cancellation_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicReader {
    /// Spawns the export loop on the current tokio runtime.
    pub fn start<E>(reader: ManualReader, exporter: E, interval: Duration) -> Self
    where
        E: PushMetricExporter,
    {
        let cancellation_token = CancellationToken::new();
        let token = cancellation_token.clone();

        info!(interval = ?interval, "starting periodic metrics export");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => export_once(&reader, &exporter).await,
                }
            }

            export_once(&reader, &exporter).await;
            if let Err(err) = exporter.shutdown().await {
                warn!(error = %err, "metrics exporter failed to shut down");
            }
            reader.shutdown();
        });

        Self {
            cancellation_token,
            handle,
        }
    }

    /// Stops the loop after a final export.
    pub async fn shutdown(self) -> Result<(), TelemetryError> {
        self.cancellation_token.cancel();
        self.handle
            .await
            .map_err(|err| TelemetryError::Internal(format!("periodic reader task failed: {err}")))
    }
}

async fn export_once<E: PushMetricExporter>(reader: &ManualReader, exporter: &E) {
    let metrics = match reader.collect() {
        Ok(metrics) => metrics,
        Err(err) => {
            debug!(error = %err, "skipping metrics export");
            return;
        }
    };

    if let Err(err) = exporter.export(&metrics).await {
        warn!(error = %err, "failed to export metrics");
    }
}
