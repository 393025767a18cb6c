//! Prometheus metrics for gateway observability.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `gateway_auth_decisions_total` - Authorization decisions (label: outcome)
//! - `gateway_audit_events_total` - Audit event delivery attempts (label: status)
//!
//! ## Histograms
//! - `gateway_auth_exchange_duration_seconds` - Authorization exchange duration
//!   (label: outcome)
//!
//! Recording functions are no-ops until [`init_metrics`] installs a recorder,
//! so library users and tests pay nothing for them.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const AUTH_DECISIONS_TOTAL: &str = "gateway_auth_decisions_total";
    pub const AUTH_EXCHANGE_DURATION_SECONDS: &str = "gateway_auth_exchange_duration_seconds";
    pub const AUDIT_EVENTS_TOTAL: &str = "gateway_audit_events_total";
}

/// Initialize the Prometheus metrics exporter.
///
/// # Errors
///
/// Returns a message if the exporter cannot be installed.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::AUTH_DECISIONS_TOTAL,
        "Total number of authorization decisions by outcome"
    );
    describe_counter!(
        names::AUDIT_EVENTS_TOTAL,
        "Total number of audit events by delivery status"
    );
    describe_histogram!(
        names::AUTH_EXCHANGE_DURATION_SECONDS,
        "Authorization exchange duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record the terminal decision for one request.
pub fn record_auth_decision(outcome: &'static str) {
    counter!(names::AUTH_DECISIONS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record how long the authorization endpoint took to answer (or fail).
pub fn record_exchange_duration(outcome: &'static str, duration_secs: f64) {
    histogram!(names::AUTH_EXCHANGE_DURATION_SECONDS, "outcome" => outcome)
        .record(duration_secs);
}

/// Record the fate of one audit event.
pub fn record_audit_event(status: &'static str) {
    counter!(names::AUDIT_EVENTS_TOTAL, "status" => status).increment(1);
}
