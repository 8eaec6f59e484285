//! Snapshot types produced by a collection.
use std::borrow::Cow;
use std::time::SystemTime;

use opentelemetry::{InstrumentationScope, KeyValue};

use crate::telemetry::metrics::aggregation::AttributeSet;

/// Aggregation temporality of a snapshot. Only cumulative aggregation is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Temporality {
    Cumulative,
}

/// Everything collected from one meter provider.
#[derive(Debug, Clone)]
pub struct ResourceMetrics {
    pub resource: Vec<KeyValue>,
    pub scope_metrics: Vec<ScopeMetrics>,
}

impl ResourceMetrics {
    /// Finds a metric by name across all scopes.
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.scope_metrics
            .iter()
            .flat_map(|scope| scope.metrics.iter())
            .find(|metric| metric.name == name)
    }
}

/// Metrics produced by a single instrumentation scope, in instrument registration order.
#[derive(Debug, Clone)]
pub struct ScopeMetrics {
    pub scope: InstrumentationScope,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone)]
pub struct Metric {
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub unit: Cow<'static, str>,
    pub data: AggregatedMetrics,
}

#[derive(Debug, Clone)]
pub enum AggregatedMetrics {
    F64(MetricData<f64>),
    U64(MetricData<u64>),
    I64(MetricData<i64>),
}

impl AggregatedMetrics {
    pub fn as_u64_sum(&self) -> Option<&Sum<u64>> {
        match self {
            AggregatedMetrics::U64(MetricData::Sum(sum)) => Some(sum),
            _ => None,
        }
    }

    pub fn as_i64_sum(&self) -> Option<&Sum<i64>> {
        match self {
            AggregatedMetrics::I64(MetricData::Sum(sum)) => Some(sum),
            _ => None,
        }
    }

    pub fn as_f64_histogram(&self) -> Option<&Histogram<f64>> {
        match self {
            AggregatedMetrics::F64(MetricData::Histogram(histogram)) => Some(histogram),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum MetricData<T> {
    Sum(Sum<T>),
    Histogram(Histogram<T>),
}

#[derive(Debug, Clone)]
pub struct Sum<T> {
    pub data_points: Vec<SumDataPoint<T>>,
    pub start_time: SystemTime,
    pub time: SystemTime,
    pub temporality: Temporality,
    pub is_monotonic: bool,
}

impl<T> Sum<T> {
    /// Finds the data point recorded for exactly this attribute set, in any order.
    pub fn data_point(&self, attributes: &[KeyValue]) -> Option<&SumDataPoint<T>> {
        let wanted = AttributeSet::from(attributes);
        self.data_points
            .iter()
            .find(|point| AttributeSet::from(&point.attributes) == wanted)
    }
}

#[derive(Debug, Clone)]
pub struct SumDataPoint<T> {
    pub attributes: Vec<KeyValue>,
    pub value: T,
}

#[derive(Debug, Clone)]
pub struct Histogram<T> {
    pub data_points: Vec<HistogramDataPoint<T>>,
    pub start_time: SystemTime,
    pub time: SystemTime,
    pub temporality: Temporality,
}

impl<T> Histogram<T> {
    pub fn data_point(&self, attributes: &[KeyValue]) -> Option<&HistogramDataPoint<T>> {
        let wanted = AttributeSet::from(attributes);
        self.data_points
            .iter()
            .find(|point| AttributeSet::from(&point.attributes) == wanted)
    }
}

#[derive(Debug, Clone)]
pub struct HistogramDataPoint<T> {
    pub attributes: Vec<KeyValue>,
    pub count: u64,
    /// Upper bounds of the buckets. `bucket_counts` has one more entry, for `+Inf`.
    pub bounds: Vec<f64>,
    pub bucket_counts: Vec<u64>,
    pub min: Option<T>,
    pub max: Option<T>,
    pub sum: T,
}
