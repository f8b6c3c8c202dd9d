//! Metrics definitions for the auth gate.
//!
//! All metrics follow Prometheus naming conventions:
//! - `ag_` prefix for the auth gate
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `outcome`: 4 values (valid, expired, invalid, missing)
//! - `status`: 3 values max per metric (success, not_found, error)
//! - `decision`: 3 values (granted, denied, bypass)
//! - `operation`: 2 values (hash, verify)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus metrics recorder and return the handle for
/// serving the exposition endpoint.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns an error if the recorder fails to install (e.g., one is
/// already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Coarse buckets for bcrypt: 50ms floor so the histogram cannot
        // leak fine-grained timing information.
        .set_buckets_for_metric(
            Matcher::Prefix("ag_bcrypt".to_string()),
            &[0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000],
        )
        .map_err(|e| format!("Failed to set bcrypt buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record an access-token verification outcome
///
/// Metric: `ag_token_verifications_total`
/// Labels: `outcome` (valid, expired, invalid, missing)
pub fn record_token_verification(outcome: &str) {
    counter!("ag_token_verifications_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a refresh-credential rotation attempt
///
/// Metric: `ag_refresh_rotations_total`
/// Labels: `status` (success, not_found, error)
pub fn record_refresh_rotation(status: &str) {
    counter!("ag_refresh_rotations_total", "status" => status.to_string()).increment(1);
}

/// Record a server-identity verification outcome (`/verify-server-token`)
///
/// Metric: `ag_server_verifications_total`
/// Labels: `outcome` (valid, expired, invalid, missing)
pub fn record_server_verification(outcome: &str) {
    counter!("ag_server_verifications_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record an authorization decision
///
/// Metric: `ag_access_decisions_total`
/// Labels: `decision` (granted, denied, bypass)
pub fn record_access_decision(decision: &str) {
    counter!("ag_access_decisions_total", "decision" => decision.to_string()).increment(1);
}

/// Record a login attempt outcome
///
/// Metric: `ag_logins_total`
/// Labels: `status` (success, invalid_credentials, error)
pub fn record_login(status: &str) {
    counter!("ag_logins_total", "status" => status.to_string()).increment(1);
}

/// Record bcrypt operation duration
///
/// Metric: `ag_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("ag_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}
