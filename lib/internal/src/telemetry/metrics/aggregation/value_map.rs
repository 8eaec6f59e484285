use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use opentelemetry::KeyValue;

use super::AttributeSet;

/// Per attribute set state of an aggregation.
pub(crate) trait Aggregator: Send + Sync + 'static {
    type Config: Send + Sync + 'static;
    type Input;

    fn create(config: &Self::Config) -> Self;
    fn update(&self, input: Self::Input);
}

struct Tracked<A> {
    /// Order in which the attribute set was first seen.
    sequence: u64,
    aggregator: A,
}

/// Maps attribute sets to their aggregators.
///
/// Updates for an existing attribute set only take a shard read lock.
pub(crate) struct ValueMap<A: Aggregator> {
    trackers: DashMap<AttributeSet, Tracked<A>>,
    next_sequence: AtomicU64,
    config: A::Config,
}

impl<A: Aggregator> ValueMap<A> {
    pub(crate) fn new(config: A::Config) -> Self {
        Self {
            trackers: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            config,
        }
    }

    pub(crate) fn measure(&self, input: A::Input, attributes: &[KeyValue]) {
        let key = AttributeSet::from(attributes);

        if let Some(tracked) = self.trackers.get(&key) {
            tracked.aggregator.update(input);
            return;
        }

        let tracked = self.trackers.entry(key).or_insert_with(|| Tracked {
            sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
            aggregator: A::create(&self.config),
        });
        tracked.aggregator.update(input);
    }

    /// Maps every tracked attribute set to a data point, in first-recorded order.
    pub(crate) fn collect<T>(&self, mut map: impl FnMut(Vec<KeyValue>, &A) -> T) -> Vec<T> {
        let mut points = self
            .trackers
            .iter()
            .map(|entry| {
                let tracked = entry.value();
                (tracked.sequence, map(entry.key().to_vec(), &tracked.aggregator))
            })
            .collect::<Vec<_>>();

        points.sort_by_key(|(sequence, _)| *sequence);
        points.into_iter().map(|(_, point)| point).collect()
    }

    pub(crate) fn config(&self) -> &A::Config {
        &self.config
    }
}
