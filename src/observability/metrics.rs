//! Metrics collection and exposition.
//!
//! # Metrics
//! - `adapter_requests_total` (counter): requests by outcome and status
//! - `adapter_request_duration_seconds` (histogram): time until response headers

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one handled request.
///
/// `outcome` is one of `proxied`, `rejected`, `overloaded`, `backend_error`.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    counter!(
        "adapter_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("adapter_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
