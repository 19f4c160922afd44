//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relayed requests by method, status
//! - `relay_request_duration_seconds` (histogram): time to response head
//! - `relay_upstream_errors_total` (counter): outbound calls that failed
//! - `relay_redirects_total` (counter): 3xx responses passed through, by status
//! - `relay_open_bodies` (gauge): backend bodies currently being streamed
//! - `relay_body_bytes_total` (counter): relayed body bytes, by outcome
//!
//! Every call is a no-op until [`init_metrics`] installs a recorder.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("relay_requests_total", "method" => method.to_string(), "status" => status.clone())
        .increment(1);
    histogram!("relay_request_duration_seconds", "method" => method.to_string(), "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error() {
    counter!("relay_upstream_errors_total").increment(1);
}

pub fn record_redirect(status: u16) {
    counter!("relay_redirects_total", "status" => status.to_string()).increment(1);
}

/// Shared by every relay in the process, so it only ever moves by one.
pub fn body_opened() {
    gauge!("relay_open_bodies").increment(1.0);
}

pub fn body_released() {
    gauge!("relay_open_bodies").decrement(1.0);
}

pub fn record_body(outcome: &'static str, bytes: u64) {
    counter!("relay_body_bytes_total", "outcome" => outcome).increment(bytes);
}
