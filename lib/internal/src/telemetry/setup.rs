//! Process-wide telemetry, installed once at startup and shut down explicitly.
use std::sync::Arc;

use cosmo_router_config::RouterConfig;
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry};

use crate::logging::logging_layers_from_logger_config;
use crate::logging::utils::DynLayer;
use crate::telemetry::error::TelemetryError;
use crate::telemetry::metrics::{
    CumulativeMeterProvider, ManualReader, PeriodicReader, StdoutMetricExporter,
};
use crate::telemetry::traces::{build_trace_provider, router_span_layer};
use crate::telemetry::{router_meter, RouterTelemetry};

const SERVICE_NAME: &str = "service.name";

pub struct TelemetryRuntime {
    pub telemetry: Arc<RouterTelemetry>,
    pub meter_provider: CumulativeMeterProvider,
    pub reader: ManualReader,
    pub tracer_provider: Option<SdkTracerProvider>,
    periodic_reader: Option<PeriodicReader>,
    _guards: Vec<WorkerGuard>,
}

impl TelemetryRuntime {
    /// Pushes the last metrics snapshot and flushes the exporters.
    pub async fn shutdown(self) -> Result<(), TelemetryError> {
        if let Some(periodic_reader) = self.periodic_reader {
            periodic_reader.shutdown().await?;
        } else {
            self.reader.shutdown();
        }

        if let Some(tracer_provider) = self.tracer_provider {
            tracer_provider
                .shutdown()
                .map_err(|err| TelemetryError::TracerShutdown(err.to_string()))?;
        }

        info!("telemetry shut down");
        Ok(())
    }
}

/// Installs the global subscriber (logging plus the router span layer) and
/// builds the metric pipeline.
///
/// Must be called from within a tokio runtime when periodic export is enabled.
pub fn init_telemetry(config: &RouterConfig) -> Result<TelemetryRuntime, TelemetryError> {
    let (mut layers, guards) = logging_layers_from_logger_config::<Registry>(&config.log)?;

    let resource = vec![KeyValue::new(
        SERVICE_NAME,
        config.telemetry.service.name.clone(),
    )];

    let mut tracer_provider = None;
    if config.telemetry.is_tracing_enabled() {
        let provider = build_trace_provider(
            &config.telemetry.tracing.exporter,
            Resource::builder()
                .with_attributes(resource.clone())
                .build(),
        );
        let layer: DynLayer<Registry> = router_span_layer::<Registry>(&provider).boxed();
        layers.push(layer);
        tracer_provider = Some(provider);
    }

    let subscriber = Registry::default().with(layers);
    tracing::subscriber::set_global_default(subscriber).map_err(|err| {
        TelemetryError::LoggingSetup(format!("a global subscriber is already installed: {err}"))
    })?;

    let meter_provider = CumulativeMeterProvider::builder()
        .with_resource(resource)
        .with_histogram_record_min_max(config.telemetry.metrics.histogram.record_min_max)
        .build();
    let meter = router_meter(&meter_provider);
    let telemetry = RouterTelemetry::from_config(&config.graph, &config.telemetry, Some(&meter));
    let reader = ManualReader::new(&meter_provider);

    let export = &config.telemetry.metrics.export;
    let periodic_reader = if config.telemetry.is_metrics_enabled() && export.enabled {
        Some(PeriodicReader::start(
            reader.clone(),
            StdoutMetricExporter,
            export.interval,
        ))
    } else {
        if export.enabled {
            warn!("metrics export is enabled but metrics are disabled, nothing will be exported");
        }
        None
    };

    info!(
        tracing = config.telemetry.is_tracing_enabled(),
        metrics = config.telemetry.is_metrics_enabled(),
        "telemetry initialized"
    );

    Ok(TelemetryRuntime {
        telemetry: Arc::new(telemetry),
        meter_provider,
        reader,
        tracer_provider,
        periodic_reader,
        _guards: guards,
    })
}
