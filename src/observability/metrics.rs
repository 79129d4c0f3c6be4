//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_connections_total` (counter): accepted client connections
//! - `proxy_active_connections` (gauge): cycles currently running
//! - `proxy_requests_total` (counter): finished cycles by outcome
//! - `proxy_errors_total` (counter): failed cycles by error kind
//! - `proxy_relayed_bytes_total` (counter): response bytes relayed to clients
//! - `proxy_cycle_duration_seconds` (histogram): accept-to-close latency
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape endpoint.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn connection_opened() {
    metrics::counter!("proxy_connections_total").increment(1);
    metrics::gauge!("proxy_active_connections").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("proxy_active_connections").decrement(1.0);
}

/// Record a completed cycle that relayed `bytes` to the client.
pub fn record_relay(bytes: u64, start: Instant) {
    metrics::counter!("proxy_requests_total", "outcome" => "relayed").increment(1);
    metrics::counter!("proxy_relayed_bytes_total").increment(bytes);
    metrics::histogram!("proxy_cycle_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a failed cycle. `kind` is a stable error label such as `connect`.
pub fn record_error(kind: &'static str, start: Instant) {
    metrics::counter!("proxy_requests_total", "outcome" => "failed").increment(1);
    metrics::counter!("proxy_errors_total", "kind" => kind).increment(1);
    metrics::histogram!("proxy_cycle_duration_seconds").record(start.elapsed().as_secs_f64());
}
