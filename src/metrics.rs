//! Prometheus metrics for gate decisions.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `tnppt_auth_verdicts_total` - Gate verdicts (labels: scheme, outcome)
//!
//! ## Histograms
//! - `tnppt_auth_gate_duration_seconds` - Time spent deciding, including body
//!   buffering and credential lookup (labels: scheme)
//!
//! The `outcome` label is `allowed` or one of `malformed_payload`,
//! `unknown_identity`, `hash_mismatch`, `expired`.
//!
//! Recording before [`init_metrics`] is a no-op, so tests and embedders that
//! never install an exporter pay nothing.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

use crate::auth::{Scheme, Verdict};

/// Metric names as constants for consistency.
pub mod names {
    pub const AUTH_VERDICTS_TOTAL: &str = "tnppt_auth_verdicts_total";
    pub const AUTH_GATE_DURATION_SECONDS: &str = "tnppt_auth_gate_duration_seconds";
}

/// Install the Prometheus exporter and describe all metrics.
///
/// # Errors
///
/// Returns a message if the exporter cannot be installed (e.g. the port is
/// taken or a recorder is already set).
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::AUTH_VERDICTS_TOTAL,
        "Total number of authentication gate verdicts"
    );
    describe_histogram!(
        names::AUTH_GATE_DURATION_SECONDS,
        "Authentication gate decision time in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Initialize metrics, logging failures instead of returning them.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record one verdict and how long it took to reach.
pub fn record_verdict(scheme: Scheme, verdict: &Verdict, elapsed: Duration) {
    counter!(names::AUTH_VERDICTS_TOTAL, "scheme" => scheme.as_str(), "outcome" => verdict.outcome())
        .increment(1);
    histogram!(names::AUTH_GATE_DURATION_SECONDS, "scheme" => scheme.as_str())
        .record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Denial, DenyReason};

    // Without an installed recorder these only verify nothing panics.

    #[test]
    fn test_record_verdict_without_recorder() {
        record_verdict(
            Scheme::HmacHeader,
            &Verdict::Deny(Denial::new(DenyReason::Expired)),
            Duration::from_micros(120),
        );
    }
}
