use cosmo_router_config::telemetry::metrics::MetricsHistogramConfig;

use opentelemetry::metrics::{Counter, Histogram, Meter, UpDownCounter};

use crate::telemetry::metrics::catalog::{descriptions, names, units};

/// The five router instruments, registered once at startup.
///
/// Handles are cheap clones sharing the same aggregation streams.
#[derive(Clone, Debug)]
pub struct RouterInstruments {
    pub(crate) requests: Counter<u64>,
    pub(crate) request_duration: Histogram<f64>,
    pub(crate) request_content_length: Counter<u64>,
    pub(crate) response_content_length: Counter<u64>,
    pub(crate) in_flight: UpDownCounter<i64>,
}

impl RouterInstruments {
    /// Histogram min/max reporting is a property of the meter provider.
    pub fn new(meter: &Meter, histogram: &MetricsHistogramConfig) -> Self {
        let requests = meter
            .u64_counter(names::REQUESTS)
            .with_description(descriptions::REQUESTS)
            .with_unit(units::NONE)
            .build();

        let request_duration = meter
            .f64_histogram(names::REQUEST_DURATION)
            .with_description(descriptions::REQUEST_DURATION)
            .with_unit(units::MILLISECONDS)
            .with_boundaries(histogram.buckets.clone())
            .build();

        let request_content_length = meter
            .u64_counter(names::REQUEST_CONTENT_LENGTH)
            .with_description(descriptions::REQUEST_CONTENT_LENGTH)
            .with_unit(units::BYTES)
            .build();

        let response_content_length = meter
            .u64_counter(names::RESPONSE_CONTENT_LENGTH)
            .with_description(descriptions::RESPONSE_CONTENT_LENGTH)
            .with_unit(units::BYTES)
            .build();

        let in_flight = meter
            .i64_up_down_counter(names::REQUESTS_IN_FLIGHT)
            .with_description(descriptions::REQUESTS_IN_FLIGHT)
            .with_unit(units::NONE)
            .build();

        Self {
            requests,
            request_duration,
            request_content_length,
            response_content_length,
            in_flight,
        }
    }
}
