use crate::config::{LogFormat, TelemetryConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Installs the global tracing subscriber and, when enabled, the Prometheus exporter.
///
/// Log output goes to stderr; stdout is reserved for fetched items.
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_thread_names(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    if config.metrics_enabled {
        let addr: SocketAddr = ([0, 0, 0, 0], config.metrics_port).into();
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;

        tracing::info!(
            port = config.metrics_port,
            "Metrics endpoint started at http://0.0.0.0:{}/metrics",
            config.metrics_port
        );
    }

    Ok(())
}
