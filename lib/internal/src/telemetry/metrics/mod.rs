pub mod aggregation;
mod capture;
pub mod catalog;
pub mod data;
pub mod exporter;
pub mod http_client_metrics;
pub mod http_server_metrics;
pub mod instrument;
pub mod periodic;
pub mod provider;
pub mod reader;
pub mod router_instruments;

use std::sync::Arc;

use opentelemetry::KeyValue;

pub use capture::Capture;
pub use exporter::{InMemoryMetricExporter, PushMetricExporter, StdoutMetricExporter};
pub use periodic::PeriodicReader;
pub use provider::{CumulativeMeterProvider, CumulativeMeterProviderBuilder};
pub use reader::ManualReader;
pub use router_instruments::RouterInstruments;

use crate::telemetry::metrics::http_client_metrics::HttpClientMetrics;
use crate::telemetry::metrics::http_server_metrics::HttpServerMetrics;

pub struct Metrics {
    pub http_server: HttpServerMetrics,
    pub http_client: HttpClientMetrics,
}

impl Metrics {
    /// `None` instruments disable every recording.
    pub fn new(instruments: Option<RouterInstruments>, router_attributes: Arc<[KeyValue]>) -> Self {
        Self {
            http_server: HttpServerMetrics::new(instruments.clone(), router_attributes),
            http_client: HttpClientMetrics::new(instruments),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, Arc::from(Vec::new()))
    }
}
