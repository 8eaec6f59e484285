use std::borrow::Cow;

use opentelemetry::metrics::SyncInstrument;
use opentelemetry::KeyValue;

use crate::telemetry::metrics::aggregation::{HistogramAggregate, Number, SumAggregate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
pub enum InstrumentKind {
    #[strum(serialize = "counter")]
    Counter,
    #[strum(serialize = "up_down_counter")]
    UpDownCounter,
    #[strum(serialize = "histogram")]
    Histogram,
}

/// Identity of a registered instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentDescriptor {
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub unit: Cow<'static, str>,
    pub kind: InstrumentKind,
}

impl InstrumentDescriptor {
    pub(crate) fn new(
        kind: InstrumentKind,
        name: Cow<'static, str>,
        description: Option<Cow<'static, str>>,
        unit: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            name,
            description: description.unwrap_or_default(),
            unit: unit.unwrap_or_default(),
            kind,
        }
    }

    /// Names the first field that differs from `other`, if any.
    pub(crate) fn conflict_with(&self, other: &InstrumentDescriptor) -> Option<&'static str> {
        if self.kind != other.kind {
            Some("kind")
        } else if self.unit != other.unit {
            Some("unit")
        } else if self.description != other.description {
            Some("description")
        } else {
            None
        }
    }
}

impl<T: Number> SyncInstrument<T> for SumAggregate<T> {
    fn measure(&self, measurement: T, attributes: &[KeyValue]) {
        SumAggregate::measure(self, measurement, attributes)
    }
}

impl<T: Number> SyncInstrument<T> for HistogramAggregate<T> {
    fn measure(&self, measurement: T, attributes: &[KeyValue]) {
        HistogramAggregate::measure(self, measurement, attributes)
    }
}

/// Handed out when a registration conflicts with an existing instrument.
pub(crate) struct DetachedInstrument;

impl<T> SyncInstrument<T> for DetachedInstrument {
    fn measure(&self, _measurement: T, _attributes: &[KeyValue]) {}
}
