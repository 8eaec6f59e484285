use std::any::Any;
use std::sync::{Arc, RwLock};

use cosmo_router_config::telemetry::metrics::default_histogram_milliseconds_buckets;
use opentelemetry::metrics::{
    Counter, Histogram, HistogramBuilder, InstrumentBuilder, InstrumentProvider, Meter,
    MeterProvider, SyncInstrument, UpDownCounter,
};
use opentelemetry::{InstrumentationScope, KeyValue};
use tracing::warn;

use crate::telemetry::metrics::aggregation::{HistogramAggregate, Number, SumAggregate};
use crate::telemetry::metrics::data::{
    AggregatedMetrics, Metric, MetricData, ResourceMetrics, ScopeMetrics,
};
use crate::telemetry::metrics::instrument::{
    DetachedInstrument, InstrumentDescriptor, InstrumentKind,
};

/// A type-erased aggregation that can be collected into a snapshot.
pub(crate) trait Stream: Any + Send + Sync {
    fn collect_aggregated(&self) -> AggregatedMetrics;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Number> Stream for SumAggregate<T> {
    fn collect_aggregated(&self) -> AggregatedMetrics {
        T::into_aggregated(MetricData::Sum(self.collect()))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: Number> Stream for HistogramAggregate<T> {
    fn collect_aggregated(&self) -> AggregatedMetrics {
        T::into_aggregated(MetricData::Histogram(self.collect()))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

struct RegisteredInstrument {
    descriptor: InstrumentDescriptor,
    stream: Arc<dyn Stream>,
}

/// A [`MeterProvider`] backed by the cumulative aggregation store.
///
/// Meters handed out are plain [`opentelemetry::metrics::Meter`]s. Counters,
/// up-down counters and `f64` histograms record into the store; every other
/// instrument kind is a no-op.
#[derive(Clone)]
pub struct CumulativeMeterProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    resource: Vec<KeyValue>,
    record_min_max: bool,
    meters: RwLock<Vec<Arc<ScopeMeter>>>,
}

#[derive(Debug, Default)]
pub struct CumulativeMeterProviderBuilder {
    resource: Vec<KeyValue>,
    record_min_max: Option<bool>,
}

impl CumulativeMeterProviderBuilder {
    pub fn with_resource(mut self, resource: Vec<KeyValue>) -> Self {
        self.resource = resource;
        self
    }

    /// Whether histograms report min and max. Defaults to `true`.
    pub fn with_histogram_record_min_max(mut self, record_min_max: bool) -> Self {
        self.record_min_max = Some(record_min_max);
        self
    }

    pub fn build(self) -> CumulativeMeterProvider {
        CumulativeMeterProvider {
            inner: Arc::new(ProviderInner {
                resource: self.resource,
                record_min_max: self.record_min_max.unwrap_or(true),
                meters: RwLock::new(Vec::new()),
            }),
        }
    }
}

impl CumulativeMeterProvider {
    pub fn builder() -> CumulativeMeterProviderBuilder {
        CumulativeMeterProviderBuilder::default()
    }

    pub fn resource(&self) -> &[KeyValue] {
        &self.inner.resource
    }

    pub(crate) fn collect(&self) -> ResourceMetrics {
        let meters = self
            .inner
            .meters
            .read()
            .unwrap_or_else(|err| err.into_inner());

        ResourceMetrics {
            resource: self.inner.resource.clone(),
            scope_metrics: meters.iter().map(|meter| meter.collect()).collect(),
        }
    }
}

impl MeterProvider for CumulativeMeterProvider {
    /// Returns the meter of `scope`, creating it on first use.
    fn meter_with_scope(&self, scope: InstrumentationScope) -> Meter {
        let mut meters = self
            .inner
            .meters
            .write()
            .unwrap_or_else(|err| err.into_inner());

        if let Some(meter) = meters.iter().find(|meter| {
            meter.scope.name() == scope.name() && meter.scope.version() == scope.version()
        }) {
            return Meter::new(meter.clone());
        }

        let meter = Arc::new(ScopeMeter {
            scope,
            record_min_max: self.inner.record_min_max,
            instruments: RwLock::new(Vec::new()),
        });
        meters.push(meter.clone());
        Meter::new(meter)
    }
}

/// The instruments of one instrumentation scope.
struct ScopeMeter {
    scope: InstrumentationScope,
    record_min_max: bool,
    instruments: RwLock<Vec<RegisteredInstrument>>,
}

impl ScopeMeter {
    /// Registers a stream, or returns the already registered one for an
    /// identical descriptor. A conflicting registration gets `None`.
    fn register<A: Stream>(
        &self,
        descriptor: InstrumentDescriptor,
        create: impl FnOnce() -> A,
    ) -> Option<Arc<A>> {
        let mut instruments = self
            .instruments
            .write()
            .unwrap_or_else(|err| err.into_inner());

        if let Some(existing) = instruments
            .iter()
            .find(|instrument| instrument.descriptor.name == descriptor.name)
        {
            if let Some(conflict) = existing.descriptor.conflict_with(&descriptor) {
                warn!(
                    name = %descriptor.name,
                    conflict,
                    "instrument already registered with a different {conflict}, measurements are dropped"
                );
                return None;
            }

            return existing.stream.clone().into_any().downcast::<A>().ok();
        }

        let stream = Arc::new(create());
        instruments.push(RegisteredInstrument {
            descriptor,
            stream: stream.clone(),
        });

        Some(stream)
    }

    fn sync_instrument<T, A>(
        &self,
        descriptor: InstrumentDescriptor,
        create: impl FnOnce() -> A,
    ) -> Arc<dyn SyncInstrument<T> + Send + Sync>
    where
        T: 'static,
        A: Stream + SyncInstrument<T>,
    {
        match self.register(descriptor, create) {
            Some(stream) => stream as Arc<dyn SyncInstrument<T> + Send + Sync>,
            None => Arc::new(DetachedInstrument),
        }
    }

    fn collect(&self) -> ScopeMetrics {
        let instruments = self
            .instruments
            .read()
            .unwrap_or_else(|err| err.into_inner());

        ScopeMetrics {
            scope: self.scope.clone(),
            metrics: instruments
                .iter()
                .map(|instrument| Metric {
                    name: instrument.descriptor.name.clone(),
                    description: instrument.descriptor.description.clone(),
                    unit: instrument.descriptor.unit.clone(),
                    data: instrument.stream.collect_aggregated(),
                })
                .collect(),
        }
    }
}

impl InstrumentProvider for ScopeMeter {
    fn u64_counter(&self, builder: InstrumentBuilder<'_, Counter<u64>>) -> Counter<u64> {
        let descriptor = InstrumentDescriptor::new(
            InstrumentKind::Counter,
            builder.name,
            builder.description,
            builder.unit,
        );

        Counter::new(self.sync_instrument(descriptor, || SumAggregate::<u64>::new(true)))
    }

    fn i64_up_down_counter(
        &self,
        builder: InstrumentBuilder<'_, UpDownCounter<i64>>,
    ) -> UpDownCounter<i64> {
        let descriptor = InstrumentDescriptor::new(
            InstrumentKind::UpDownCounter,
            builder.name,
            builder.description,
            builder.unit,
        );

        UpDownCounter::new(self.sync_instrument(descriptor, || SumAggregate::<i64>::new(false)))
    }

    fn f64_histogram(&self, builder: HistogramBuilder<'_, Histogram<f64>>) -> Histogram<f64> {
        let descriptor = InstrumentDescriptor::new(
            InstrumentKind::Histogram,
            builder.name,
            builder.description,
            builder.unit,
        );
        let boundaries = builder
            .boundaries
            .unwrap_or_else(default_histogram_milliseconds_buckets);
        let record_min_max = self.record_min_max;

        Histogram::new(self.sync_instrument(descriptor, || {
            HistogramAggregate::<f64>::new(boundaries, record_min_max)
        }))
    }
}
