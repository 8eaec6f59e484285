use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configures metrics collection and the optional periodic export.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Records the router metrics.
    ///
    /// Default: `true`.
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    /// Histogram aggregation settings.
    #[serde(default)]
    pub histogram: MetricsHistogramConfig,
    /// Periodic push of collected metrics.
    #[serde(default)]
    pub export: MetricsExportConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            histogram: MetricsHistogramConfig::default(),
            export: MetricsExportConfig::default(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct MetricsHistogramConfig {
    /// Explicit bucket boundaries, in milliseconds.
    #[serde(default = "default_histogram_milliseconds_buckets")]
    pub buckets: Vec<f64>,
    /// Records min and max per data point.
    ///
    /// Default: `true`.
    #[serde(default = "default_record_min_max")]
    pub record_min_max: bool,
}

impl Default for MetricsHistogramConfig {
    fn default() -> Self {
        Self {
            buckets: default_histogram_milliseconds_buckets(),
            record_min_max: default_record_min_max(),
        }
    }
}

pub fn default_histogram_milliseconds_buckets() -> Vec<f64> {
    vec![
        0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0, 5000.0,
        7500.0, 10000.0,
    ]
}

fn default_record_min_max() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct MetricsExportConfig {
    /// Default: `false`.
    #[serde(default)]
    pub enabled: bool,
    /// Interval between periodic metric export attempts.
    ///
    /// Default: `15s`.
    #[serde(
        default = "default_metrics_interval",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub interval: Duration,
}

impl Default for MetricsExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: default_metrics_interval(),
        }
    }
}

fn default_metrics_interval() -> Duration {
    Duration::from_secs(15)
}
