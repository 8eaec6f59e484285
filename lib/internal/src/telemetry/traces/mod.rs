//! Span tracer.
//!
//! Pipeline phases open spans through the typed wrappers in [`spans`].
//! `tracing-opentelemetry` turns them into OpenTelemetry spans of the router
//! tracer. The provider uses a simple span processor, so every span is
//! exported the moment it ends and children always reach the exporter before
//! their ancestors.
use cosmo_router_config::telemetry::tracing::SpanExporterKind;
use opentelemetry::trace::TracerProvider;
use opentelemetry::InstrumentationScope;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing::{Metadata, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::telemetry::metrics::catalog::scope;
use crate::telemetry::traces::spans::TARGET_NAME;

pub mod spans;

/// Only router spans reach the tracer. Events and spans of other targets are dropped.
pub fn is_router_span(metadata: &Metadata<'_>) -> bool {
    metadata.is_span() && metadata.target() == TARGET_NAME
}

pub fn build_trace_provider(kind: &SpanExporterKind, resource: Resource) -> SdkTracerProvider {
    let builder = SdkTracerProvider::builder().with_resource(resource);

    match kind {
        SpanExporterKind::Stdout => builder
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build(),
        // no processor, spans are recorded and dropped on end
        SpanExporterKind::None => builder.build(),
    }
}

pub fn router_tracer(provider: &SdkTracerProvider) -> SdkTracer {
    provider.tracer_with_scope(
        InstrumentationScope::builder(scope::NAME)
            .with_version(scope::VERSION)
            .build(),
    )
}

/// The layer that feeds router spans into `provider`.
pub fn router_span_layer<S>(provider: &SdkTracerProvider) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync + 'static,
{
    tracing_opentelemetry::layer()
        .with_tracer(router_tracer(provider))
        .with_tracked_inactivity(false)
        .with_location(false)
        .with_threads(false)
        .with_filter(filter_fn(is_router_span))
}
