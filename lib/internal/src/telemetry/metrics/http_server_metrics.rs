//! Request level recordings: totals at completion and the in-flight gauge.
use std::sync::Arc;
use std::time::Instant;

use opentelemetry::{metrics::UpDownCounter, KeyValue};

use crate::telemetry::attributes::{RequestAttributes, SubgraphIdentity};
use crate::telemetry::metrics::capture::Capture;
#[cfg(debug_assertions)]
use crate::telemetry::metrics::catalog::{debug_assert_attrs, names};
use crate::telemetry::metrics::router_instruments::RouterInstruments;

pub struct HttpServerMetrics {
    instruments: Option<RouterInstruments>,
    router_attributes: Arc<[KeyValue]>,
}

pub struct HttpServerRequestState<'a> {
    instruments: &'a RouterInstruments,
    _router_in_flight: InFlightGuard<'a>,
    request_in_flight: Option<InFlightGuard<'a>>,
    attributes: RequestAttributes,
    request_content_length: u64,
    started_at: Instant,
}

/// Holds one in-flight increment and releases it on drop.
pub struct InFlightGuard<'a> {
    counter: &'a UpDownCounter<i64>,
    attributes: Arc<[KeyValue]>,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(counter: &'a UpDownCounter<i64>, attributes: Arc<[KeyValue]>) -> Self {
        #[cfg(debug_assertions)]
        debug_assert_attrs(names::REQUESTS_IN_FLIGHT, &attributes);

        counter.add(1, &attributes);
        Self {
            counter,
            attributes,
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.add(-1, &self.attributes);
    }
}

impl HttpServerMetrics {
    pub fn new(instruments: Option<RouterInstruments>, router_attributes: Arc<[KeyValue]>) -> Self {
        Self {
            instruments,
            router_attributes,
        }
    }

    /// Starts tracking a request. The router scope in-flight count goes up right away.
    ///
    /// `attributes` are used for completion recordings until the operation is resolved.
    pub fn capture_request(
        &self,
        attributes: RequestAttributes,
        request_content_length: u64,
    ) -> Capture<HttpServerRequestState<'_>> {
        let Some(instruments) = &self.instruments else {
            return Capture::disabled();
        };

        Capture::enabled(HttpServerRequestState {
            instruments,
            _router_in_flight: InFlightGuard::acquire(
                &instruments.in_flight,
                self.router_attributes.clone(),
            ),
            request_in_flight: None,
            attributes,
            request_content_length,
            started_at: Instant::now(),
        })
    }
}

impl Capture<HttpServerRequestState<'_>> {
    /// The operation identity is known: switches to the full request scope and
    /// counts the request as in flight at that scope.
    pub fn operation_resolved(&mut self, attributes: RequestAttributes) {
        let Some(state) = self.as_mut() else {
            return;
        };

        state.request_in_flight = Some(InFlightGuard::acquire(
            &state.instruments.in_flight,
            attributes.shared(),
        ));
        state.attributes = attributes;
    }

    /// Records the request totals. In-flight counts are released when the state drops.
    ///
    /// `served_by` is the subgraph that served the whole operation, if there was exactly one.
    pub fn finish(
        self,
        status_code: u16,
        response_content_length: u64,
        served_by: Option<&SubgraphIdentity>,
    ) {
        let Some(state) = self.take() else {
            return;
        };

        let instruments = state.instruments;
        let attributes = state.attributes.with_status(status_code);
        let duration_ms = state.started_at.elapsed().as_secs_f64() * 1000.0;

        #[cfg(debug_assertions)]
        debug_assert_attrs(names::REQUESTS, &attributes);

        instruments.requests.add(1, &attributes);
        instruments.request_duration.record(duration_ms, &attributes);
        instruments
            .request_content_length
            .add(state.request_content_length, &attributes);

        if let Some(subgraph) = served_by {
            let subgraph_attributes = state
                .attributes
                .for_subgraph_with_status(subgraph, status_code);

            #[cfg(debug_assertions)]
            debug_assert_attrs(names::RESPONSE_CONTENT_LENGTH, &subgraph_attributes);

            instruments
                .response_content_length
                .add(response_content_length, &subgraph_attributes);
        }

        instruments
            .response_content_length
            .add(response_content_length, &attributes);
    }
}
