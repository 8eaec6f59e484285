//! Cumulative, lock-light aggregation of recorded measurements.
//!
//! Every instrument owns a [`ValueMap`](value_map::ValueMap) keyed by
//! [`AttributeSet`]. Sums are plain atomics, histograms keep their buckets
//! behind a per-attribute-set mutex. Nothing is ever reset by collection.
mod attribute_set;
mod histogram;
mod sum;
mod value_map;

use std::fmt::Debug;
use std::ops::Add;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

pub use attribute_set::AttributeSet;
pub(crate) use histogram::HistogramAggregate;
pub(crate) use sum::SumAggregate;

use crate::telemetry::metrics::data::{AggregatedMetrics, MetricData};

/// Numeric types an instrument can record.
pub trait Number:
    Copy
    + Default
    + PartialOrd
    + Add<Output = Self>
    + Debug
    + Send
    + Sync
    + 'static
    + private::Sealed
{
    #[doc(hidden)]
    type Atomic: AtomicNumber<Self>;

    fn into_float(self) -> f64;
    fn min_value() -> Self;
    fn max_value() -> Self;

    #[doc(hidden)]
    fn into_aggregated(data: MetricData<Self>) -> AggregatedMetrics;
}

#[doc(hidden)]
pub trait AtomicNumber<T>: Default + Send + Sync + 'static {
    fn add(&self, value: T);
    fn load(&self) -> T;
}

mod private {
    pub trait Sealed {}
    impl Sealed for u64 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

impl AtomicNumber<u64> for AtomicU64 {
    fn add(&self, value: u64) {
        self.fetch_add(value, Ordering::Relaxed);
    }

    fn load(&self) -> u64 {
        AtomicU64::load(self, Ordering::Relaxed)
    }
}

impl AtomicNumber<i64> for AtomicI64 {
    fn add(&self, value: i64) {
        self.fetch_add(value, Ordering::Relaxed);
    }

    fn load(&self) -> i64 {
        AtomicI64::load(self, Ordering::Relaxed)
    }
}

/// An `f64` stored as its bit pattern.
#[derive(Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicNumber<f64> for AtomicF64 {
    fn add(&self, value: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + value).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl Number for u64 {
    type Atomic = AtomicU64;

    fn into_float(self) -> f64 {
        self as f64
    }

    fn min_value() -> Self {
        u64::MIN
    }

    fn max_value() -> Self {
        u64::MAX
    }

    fn into_aggregated(data: MetricData<Self>) -> AggregatedMetrics {
        AggregatedMetrics::U64(data)
    }
}

impl Number for i64 {
    type Atomic = AtomicI64;

    fn into_float(self) -> f64 {
        self as f64
    }

    fn min_value() -> Self {
        i64::MIN
    }

    fn max_value() -> Self {
        i64::MAX
    }

    fn into_aggregated(data: MetricData<Self>) -> AggregatedMetrics {
        AggregatedMetrics::I64(data)
    }
}

impl Number for f64 {
    type Atomic = AtomicF64;

    fn into_float(self) -> f64 {
        self
    }

    fn min_value() -> Self {
        f64::MIN
    }

    fn max_value() -> Self {
        f64::MAX
    }

    fn into_aggregated(data: MetricData<Self>) -> AggregatedMetrics {
        AggregatedMetrics::F64(data)
    }
}
