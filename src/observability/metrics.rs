//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by endpoint, version, status
//! - `router_request_duration_seconds` (histogram): latency by endpoint
//! - `router_instances` (gauge): instances launched at startup
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - Prometheus exposition is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished RPC.
pub fn record_request(endpoint: &'static str, version: &str, status: u16, start: Instant) {
    metrics::counter!(
        "router_requests_total",
        "endpoint" => endpoint,
        "version" => version.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("router_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record how many instances the supervisor started.
pub fn record_instances(count: usize) {
    metrics::gauge!("router_instances").set(count as f64);
}
