//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_retries_total` (counter): outbound attempts that were retried
//! - `gateway_csrf_rejected_total` (counter): rejections by reason

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Prometheus exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus exporter");
        }
    }
}

fn describe() {
    metrics::describe_counter!(
        "gateway_requests_total",
        "Requests handled, labeled by method and status"
    );
    metrics::describe_histogram!(
        "gateway_request_duration_seconds",
        "Request latency in seconds"
    );
    metrics::describe_counter!(
        "gateway_retries_total",
        "Outbound attempts that failed and were retried"
    );
    metrics::describe_counter!(
        "gateway_csrf_rejected_total",
        "State-changing requests rejected by CSRF verification"
    );
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry() {
    metrics::counter!("gateway_retries_total").increment(1);
}

pub fn record_csrf_rejected(reason: &'static str) {
    metrics::counter!("gateway_csrf_rejected_total", "reason" => reason).increment(1);
}
