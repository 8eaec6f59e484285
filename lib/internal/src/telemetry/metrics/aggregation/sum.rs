use std::time::SystemTime;

use opentelemetry::KeyValue;

use super::value_map::{Aggregator, ValueMap};
use super::{AtomicNumber, Number};
use crate::telemetry::metrics::data::{Sum, SumDataPoint, Temporality};

struct SumTracker<T: Number> {
    value: T::Atomic,
}

impl<T: Number> Aggregator for SumTracker<T> {
    type Config = ();
    type Input = T;

    fn create(_: &()) -> Self {
        Self {
            value: T::Atomic::default(),
        }
    }

    fn update(&self, value: T) {
        self.value.add(value)
    }
}

/// Cumulative sum of counter or up-down-counter measurements.
pub(crate) struct SumAggregate<T: Number> {
    value_map: ValueMap<SumTracker<T>>,
    monotonic: bool,
    start_time: SystemTime,
}

impl<T: Number> SumAggregate<T> {
    pub(crate) fn new(monotonic: bool) -> Self {
        Self {
            value_map: ValueMap::new(()),
            monotonic,
            start_time: SystemTime::now(),
        }
    }

    pub(crate) fn measure(&self, value: T, attributes: &[KeyValue]) {
        self.value_map.measure(value, attributes)
    }

    pub(crate) fn collect(&self) -> Sum<T> {
        let data_points = self
            .value_map
            .collect(|attributes, tracker| SumDataPoint {
                attributes,
                value: tracker.value.load(),
            });

        Sum {
            data_points,
            start_time: self.start_time,
            time: SystemTime::now(),
            temporality: Temporality::Cumulative,
            is_monotonic: self.monotonic,
        }
    }
}
