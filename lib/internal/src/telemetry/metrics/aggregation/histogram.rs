use std::sync::Mutex;
use std::time::SystemTime;

use opentelemetry::KeyValue;

use super::value_map::{Aggregator, ValueMap};
use super::Number;
use crate::telemetry::metrics::data::{Histogram, HistogramDataPoint, Temporality};

struct HistogramTracker<T> {
    buckets: Mutex<Buckets<T>>,
}

impl<T: Number> Aggregator for HistogramTracker<T> {
    /// Number of buckets, including the `+Inf` one.
    type Config = usize;
    /// Value and bucket index
    type Input = (T, usize);

    fn create(count: &usize) -> Self {
        HistogramTracker {
            buckets: Mutex::new(Buckets::new(*count)),
        }
    }

    fn update(&self, (value, index): (T, usize)) {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|_| panic!("histogram buckets lock poisoned"));

        buckets.bin(index, value);
    }
}

struct Buckets<T> {
    counts: Vec<u64>,
    count: u64,
    total: T,
    min: T,
    max: T,
}

impl<T: Number> Buckets<T> {
    fn new(n: usize) -> Buckets<T> {
        Buckets {
            counts: vec![0; n],
            count: 0,
            total: T::default(),
            min: T::max_value(),
            max: T::min_value(),
        }
    }

    fn bin(&mut self, index: usize, value: T) {
        self.counts[index] += 1;
        self.count += 1;
        self.total = self.total + value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }
}

/// Cumulative histogram with explicit bucket boundaries.
pub(crate) struct HistogramAggregate<T: Number> {
    value_map: ValueMap<HistogramTracker<T>>,
    bounds: Vec<f64>,
    record_min_max: bool,
    start_time: SystemTime,
}

impl<T: Number> HistogramAggregate<T> {
    pub(crate) fn new(mut bounds: Vec<f64>, record_min_max: bool) -> Self {
        bounds.retain(|bound| !bound.is_nan());
        bounds.sort_by(|a, b| a.total_cmp(b));
        bounds.dedup();

        Self {
            value_map: ValueMap::new(bounds.len() + 1),
            bounds,
            record_min_max,
            start_time: SystemTime::now(),
        }
    }

    pub(crate) fn measure(&self, measurement: T, attributes: &[KeyValue]) {
        let value = measurement.into_float();
        if value.is_nan() {
            return;
        }

        // buckets are upper-inclusive: (bounds[i-1], bounds[i]]
        let index = self.bounds.partition_point(|&bound| bound < value);
        self.value_map.measure((measurement, index), attributes);
    }

    pub(crate) fn collect(&self) -> Histogram<T> {
        let data_points = self.value_map.collect(|attributes, tracker| {
            let buckets = tracker
                .buckets
                .lock()
                .unwrap_or_else(|_| panic!("histogram buckets lock poisoned"));

            let (min, max) = if self.record_min_max && buckets.count > 0 {
                (Some(buckets.min), Some(buckets.max))
            } else {
                (None, None)
            };

            HistogramDataPoint {
                attributes,
                count: buckets.count,
                bounds: self.bounds.clone(),
                bucket_counts: buckets.counts.clone(),
                min,
                max,
                sum: buckets.total,
            }
        });

        debug_assert!(data_points
            .iter()
            .all(|point| point.bucket_counts.len() == *self.value_map.config()));

        Histogram {
            data_points,
            start_time: self.start_time,
            time: SystemTime::now(),
            temporality: Temporality::Cumulative,
        }
    }
}
