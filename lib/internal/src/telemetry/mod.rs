//! Router telemetry: attribute resolution, spans and metrics of the request pipeline.
//!
//! [`RouterTelemetry`] is built once at startup and shared by every request.
//! Each request drives a [`request::RequestTelemetry`] through its lifecycle.
use cosmo_router_config::graph::GraphConfig;
use cosmo_router_config::telemetry::TelemetryConfig;
use opentelemetry::metrics::{Meter, MeterProvider};
use opentelemetry::InstrumentationScope;

use crate::graphql::OperationProtocol;
use crate::telemetry::attributes::{AttributeResolver, RequestContext, RouterAttributes};
use crate::telemetry::metrics::catalog::scope;
use crate::telemetry::metrics::{Metrics, RouterInstruments};
use crate::telemetry::request::RequestTelemetry;

pub mod attributes;
pub mod error;
pub mod metrics;
pub mod request;
pub mod setup;
pub mod traces;

pub struct RouterTelemetry {
    resolver: AttributeResolver,
    metrics: Metrics,
}

impl RouterTelemetry {
    pub fn new(resolver: AttributeResolver, metrics: Metrics) -> Self {
        Self { resolver, metrics }
    }

    /// Registers the router instruments on `meter` unless metrics are disabled.
    pub fn from_config(
        graph: &GraphConfig,
        config: &TelemetryConfig,
        meter: Option<&Meter>,
    ) -> Self {
        let resolver = AttributeResolver::new(
            &RouterAttributes::from_config(graph, config),
            &config.client_headers,
        );

        let instruments = match meter {
            Some(meter) if config.is_metrics_enabled() => {
                Some(RouterInstruments::new(meter, &config.metrics.histogram))
            }
            _ => None,
        };

        let metrics = Metrics::new(instruments, resolver.router_scope());
        Self::new(resolver, metrics)
    }

    pub fn resolver(&self) -> &AttributeResolver {
        &self.resolver
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Opens the root span and counts the request as in flight.
    pub fn start_request<C: RequestContext + ?Sized>(
        &self,
        context: &C,
        protocol: OperationProtocol,
        request_content_length: u64,
    ) -> RequestTelemetry<'_> {
        let client = self.resolver.resolve_client(context);
        RequestTelemetry::new(self, client, protocol, request_content_length)
    }
}

/// The meter every router instrument is registered on.
pub fn router_meter(provider: &impl MeterProvider) -> Meter {
    provider.meter_with_scope(
        InstrumentationScope::builder(scope::NAME)
            .with_version(scope::VERSION)
            .build(),
    )
}
