//! Metrics collection and exposition.
//!
//! # Metrics
//! - `forwarder_requests_total` (counter): forwarded calls by status and outcome
//! - `forwarder_request_duration_seconds` (histogram): whole-call latency, retries included
//! - `forwarder_retries_total` (counter): re-issued attempts by reason
//! - `forwarder_gateway_up` (gauge): 1 when the last health probe succeeded
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_forward(status: u16, outcome: &'static str, duration: Duration) {
    counter!(
        "forwarder_requests_total",
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("forwarder_request_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_retry(reason: &str) {
    counter!("forwarder_retries_total", "reason" => reason.to_string()).increment(1);
}

pub fn record_gateway_health(up: bool) {
    gauge!("forwarder_gateway_up").set(if up { 1.0 } else { 0.0 });
}
