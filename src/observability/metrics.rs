//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (request outcomes, latency, rejections)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by status and outcome
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_rate_limited_total` (counter): admissions refused by the limiter
//! - `gateway_fetch_outcomes_total` (counter): outbound fetch results by tag
//! - `gateway_limiter_swept_records_total` (counter): stale records evicted
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Outcome labels come from the closed error taxonomy, so cardinality
//!   is bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
///
/// Called once at startup; a failure is logged and the gateway keeps
/// running without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one completed request with its final status and outcome tag.
pub fn record_request(status: u16, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a request refused by the rate limiter.
pub fn record_rate_limited() {
    metrics::counter!("gateway_rate_limited_total").increment(1);
}

/// Record the result of an outbound fetch attempt.
pub fn record_fetch_outcome(outcome: &'static str) {
    metrics::counter!("gateway_fetch_outcomes_total", "outcome" => outcome).increment(1);
}

/// Record records evicted by the limiter sweep.
pub fn record_sweep(removed: usize) {
    metrics::counter!("gateway_limiter_swept_records_total").increment(removed as u64);
}
