//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): GraphQL requests by status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_guard_rejections_total` (counter): envelope rejections by code
//! - `gateway_auth_rejections_total` (counter): failed API-key checks
//! - `gateway_rate_limited_total` (counter): 429 responses
//! - `gateway_upstream_requests_total` (counter): upstream calls by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_graphql_request(status: u16, start: Instant) {
    counter!("gateway_requests_total", "status" => status.to_string()).increment(1);
    histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_guard_rejection(code: &'static str) {
    counter!("gateway_guard_rejections_total", "code" => code).increment(1);
}

pub fn record_auth_rejection() {
    counter!("gateway_auth_rejections_total").increment(1);
}

pub fn record_rate_limited() {
    counter!("gateway_rate_limited_total").increment(1);
}

pub fn record_upstream(outcome: &'static str) {
    counter!("gateway_upstream_requests_total", "outcome" => outcome).increment(1);
}
