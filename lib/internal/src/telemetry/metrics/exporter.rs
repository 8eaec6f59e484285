use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use crate::telemetry::error::TelemetryError;
use crate::telemetry::metrics::data::{AggregatedMetrics, MetricData, ResourceMetrics};

pub const METRICS_EXPORT_TARGET: &str = "cosmo-router::metrics";

/// Receives snapshots pushed by a [`PeriodicReader`](super::periodic::PeriodicReader).
#[async_trait]
pub trait PushMetricExporter: Send + Sync + 'static {
    async fn export(&self, metrics: &ResourceMetrics) -> Result<(), TelemetryError>;

    async fn shutdown(&self) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Keeps every exported snapshot in memory.
#[derive(Clone, Default)]
pub struct InMemoryMetricExporter {
    metrics: Arc<Mutex<Vec<ResourceMetrics>>>,
}

impl fmt::Debug for InMemoryMetricExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryMetricExporter").finish()
    }
}

impl InMemoryMetricExporter {
    pub fn finished_metrics(&self) -> Result<Vec<ResourceMetrics>, TelemetryError> {
        self.metrics
            .lock()
            .map(|metrics| metrics.clone())
            .map_err(|err| TelemetryError::Internal(err.to_string()))
    }

    pub fn reset(&self) {
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.clear();
        }
    }
}

#[async_trait]
impl PushMetricExporter for InMemoryMetricExporter {
    async fn export(&self, metrics: &ResourceMetrics) -> Result<(), TelemetryError> {
        self.metrics
            .lock()
            .map(|mut exported| exported.push(metrics.clone()))
            .map_err(|err| TelemetryError::MetricsExport(err.to_string()))
    }
}

/// Logs every data point of a snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutMetricExporter;

#[async_trait]
impl PushMetricExporter for StdoutMetricExporter {
    async fn export(&self, metrics: &ResourceMetrics) -> Result<(), TelemetryError> {
        for scope in &metrics.scope_metrics {
            for metric in &scope.metrics {
                for point in describe_points(&metric.data) {
                    info!(
                        target: METRICS_EXPORT_TARGET,
                        scope = scope.scope.name(),
                        metric = %metric.name,
                        unit = %metric.unit,
                        "{point}"
                    );
                }
            }
        }

        Ok(())
    }
}

fn describe_points(data: &AggregatedMetrics) -> Vec<String> {
    match data {
        AggregatedMetrics::U64(data) => describe(data),
        AggregatedMetrics::I64(data) => describe(data),
        AggregatedMetrics::F64(data) => describe(data),
    }
}

fn describe<T: fmt::Debug>(data: &MetricData<T>) -> Vec<String> {
    match data {
        MetricData::Sum(sum) => sum
            .data_points
            .iter()
            .map(|point| format!("value={:?} {}", point.value, render(&point.attributes)))
            .collect(),
        MetricData::Histogram(histogram) => histogram
            .data_points
            .iter()
            .map(|point| {
                format!(
                    "count={} sum={:?} buckets={:?} {}",
                    point.count,
                    point.sum,
                    point.bucket_counts,
                    render(&point.attributes)
                )
            })
            .collect(),
    }
}

fn render(attributes: &[opentelemetry::KeyValue]) -> String {
    attributes
        .iter()
        .map(|kv| format!("{}={}", kv.key, kv.value))
        .collect::<Vec<_>>()
        .join(",")
}
