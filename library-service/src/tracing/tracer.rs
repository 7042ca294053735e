use std::error::Error;

use opentelemetry::{KeyValue, global};
use opentelemetry_sdk::{Resource, propagation::TraceContextPropagator, trace::SdkTracerProvider};
use opentelemetry_stdout::SpanExporter;
use tracing_subscriber::{EnvFilter, fmt::format::Format, prelude::*};

use crate::config::{AppConfig, TracingConfig};

/// Tracer configuration and initialization.
pub struct Tracer;

impl Tracer {
    /// Installs the tracing subscriber and the OpenTelemetry tracer provider.
    ///
    /// Spans are exported to stdout for [`TracingConfig::Stdout`] and kept
    /// in-process for [`TracingConfig::Memory`].
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed.
    pub fn install(config: &AppConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
        global::set_text_map_propagator(TraceContextPropagator::new());

        let mut resource = Resource::builder().with_service_name(config.distribution.name.clone());
        if let Some(version) = config.distribution.version.clone() {
            resource = resource.with_attribute(KeyValue::new("version", version));
        }

        let mut provider = SdkTracerProvider::builder().with_resource(resource.build());
        if let TracingConfig::Stdout = config.tracing {
            provider = provider.with_simple_exporter(SpanExporter::default());
        }
        global::set_tracer_provider(provider.build());

        let layer = tracing_subscriber::fmt::layer()
            .event_format(Format::default().pretty())
            .with_filter(EnvFilter::from_default_env());

        tracing_subscriber::registry().with(layer).try_init()?;

        Ok(())
    }
}
