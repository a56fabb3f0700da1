// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging with JSON formatting
///
/// Sets up the tracing subscriber with JSON output, log levels from
/// configuration or the `RUST_LOG` environment variable, and span context in
/// every log entry.
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(
        log_level = log_level,
        "Structured logging initialized with JSON formatting"
    );

    Ok(())
}

/// Install the Prometheus metrics recorder and describe all metrics.
///
/// Returns the handle used to render the exposition text for `GET /metrics`.
/// The watcher binary can ignore the handle; installing the recorder is
/// enough for its counters to register process-wide.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    describe_counter!("watch_cycles_total", "Total number of watch cycles run");
    describe_counter!(
        "listings_fetched_total",
        "Total number of latest-listing lookups that returned a listing"
    );
    describe_counter!(
        "listing_fetch_failures_total",
        "Total number of failed marketplace lookups"
    );
    describe_counter!(
        "novel_listings_total",
        "Total number of listings judged novel and claimed for alerting"
    );
    describe_counter!(
        "alerts_delivered_total",
        "Total number of alerts accepted by the consumer"
    );
    describe_counter!(
        "alert_delivery_failures_total",
        "Total number of alert deliveries that failed"
    );
    describe_histogram!(
        "watch_cycle_duration_seconds",
        "Duration of a full watch cycle in seconds"
    );

    tracing::info!("Prometheus metrics recorder initialized");

    Ok(handle)
}

/// Record a completed watch cycle and its duration
#[inline]
pub fn record_cycle(duration_seconds: f64) {
    counter!("watch_cycles_total").increment(1);
    histogram!("watch_cycle_duration_seconds").record(duration_seconds);
}

/// Record an accepted alert delivery
#[inline]
pub fn record_alert_delivered(client_id: &str) {
    counter!("alerts_delivered_total", "client_id" => client_id.to_string()).increment(1);
}

/// Record a failed alert delivery
#[inline]
pub fn record_alert_failure(client_id: &str, reason: &str) {
    counter!(
        "alert_delivery_failures_total",
        "client_id" => client_id.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}
