use color_eyre::Result;
use color_eyre::eyre::Context;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber: logs on stderr, and spans exported over
/// OTLP/gRPC when `otlp_endpoint` is set. Shut the returned provider down
/// before exiting to flush pending spans.
pub fn init_tracing(
    service_name: &str,
    otlp_endpoint: Option<&str>,
    filter: &str,
) -> Result<Option<SdkTracerProvider>> {
    let filter_layer = parse_filter(filter)?;

    let tracer_provider = otlp_endpoint
        .map(|endpoint| otlp_tracer_provider(service_name, endpoint))
        .transpose()?;
    let telemetry_layer = tracer_provider.as_ref().map(|_| {
        let tracer = opentelemetry::global::tracer(service_name.to_string());
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    // stdout is reserved for command output
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(telemetry_layer)
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    Ok(tracer_provider)
}

fn parse_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).wrap_err_with(|| format!("Invalid tracing filter: {}", filter))
}

/// Batches spans to `endpoint` and registers the provider globally.
fn otlp_tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .wrap_err("Failed to create OTLP span exporter")?;

    let resource = Resource::builder()
        .with_attributes(vec![KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            service_name.to_string(),
        )])
        .build();

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();
    opentelemetry::global::set_tracer_provider(tracer_provider.clone());
    Ok(tracer_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter("warn").is_ok());
        assert!(parse_filter("spotify_web_api=debug,reqwest=info").is_ok());

        let error = parse_filter("spotify_web_api=loud").unwrap_err();
        assert!(error.to_string().contains("Invalid tracing filter: spotify_web_api=loud"));
    }

    #[test]
    fn test_invalid_filter_installs_nothing() {
        let result = init_tracing("spotify-api-test", None, "spotify_web_api=loud");
        assert!(result.is_err());
    }
}
