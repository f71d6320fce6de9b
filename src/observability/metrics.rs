//! Metrics collection and exposition.
//!
//! # Metrics
//! - `contact_submissions_total` (counter): submissions by outcome
//! - `contact_delivery_duration_seconds` (histogram): backend latency by sink
//! - `contact_http_requests_total` (counter): responses by method, status
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed, so tests and
//!   metrics-disabled deployments pay nothing
//! - Labels are low-cardinality: no emails, no paths beyond the route

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Final state of a `POST /contact` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Invalid,
    DeliveryFailed,
    RateLimited,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Accepted => "accepted",
            Outcome::Invalid => "invalid",
            Outcome::DeliveryFailed => "delivery_failed",
            Outcome::RateLimited => "rate_limited",
        }
    }
}

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission(outcome: Outcome) {
    metrics::counter!("contact_submissions_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_delivery(sink: &'static str, start: Instant) {
    metrics::histogram!("contact_delivery_duration_seconds", "sink" => sink)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_response(method: &str, status: u16) {
    metrics::counter!(
        "contact_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
