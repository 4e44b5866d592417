//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by outcome and status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_resolutions_total` (counter): resolutions by result
//! - `gateway_cache_entries` (gauge): resolution cache size
//! - `gateway_target_health` (gauge): 1=healthy, 0=unhealthy or no longer
//!   cached, per target
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional and bound to its own address

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a resolution attempt (`hit`, `resolved`, `not_found`, `error`, `timeout`).
pub fn record_resolution(result: &'static str) {
    metrics::counter!("gateway_resolutions_total", "result" => result).increment(1);
}

pub fn record_cache_size(entries: usize) {
    metrics::gauge!("gateway_cache_entries").set(entries as f64);
}

pub fn record_target_health(namespace: &str, service: &str, healthy: bool) {
    metrics::gauge!(
        "gateway_target_health",
        "namespace" => namespace.to_string(),
        "service" => service.to_string()
    )
    .set(if healthy { 1.0 } else { 0.0 });
}

/// Zero the health series of a target that left the cache.
pub fn clear_target_health(namespace: &str, service: &str) {
    record_target_health(namespace, service, false);
}
