//! Subgraph call recordings.
use std::time::Instant;

use opentelemetry::KeyValue;

use crate::telemetry::metrics::capture::Capture;
#[cfg(debug_assertions)]
use crate::telemetry::metrics::catalog::{debug_assert_attrs, names};
use crate::telemetry::metrics::router_instruments::RouterInstruments;

pub struct HttpClientMetrics {
    instruments: Option<RouterInstruments>,
}

pub struct HttpClientRequestState<'a> {
    instruments: &'a RouterInstruments,
    attributes: Vec<KeyValue>,
    request_content_length: u64,
    started_at: Instant,
}

impl HttpClientMetrics {
    pub fn new(instruments: Option<RouterInstruments>) -> Self {
        Self { instruments }
    }

    /// `attributes` is the subgraph scope of the call.
    pub fn capture_request(
        &self,
        attributes: Vec<KeyValue>,
        request_content_length: u64,
    ) -> Capture<HttpClientRequestState<'_>> {
        let Some(instruments) = &self.instruments else {
            return Capture::disabled();
        };

        Capture::enabled(HttpClientRequestState {
            instruments,
            attributes,
            request_content_length,
            started_at: Instant::now(),
        })
    }
}

impl Capture<HttpClientRequestState<'_>> {
    /// Records the call, whatever its outcome. The status is not part of the subgraph scope.
    pub fn finish(self) {
        let Some(state) = self.take() else {
            return;
        };

        let instruments = state.instruments;
        let duration_ms = state.started_at.elapsed().as_secs_f64() * 1000.0;

        #[cfg(debug_assertions)]
        debug_assert_attrs(names::REQUESTS, &state.attributes);

        instruments.requests.add(1, &state.attributes);
        instruments
            .request_duration
            .record(duration_ms, &state.attributes);
        instruments
            .request_content_length
            .add(state.request_content_length, &state.attributes);
    }
}
