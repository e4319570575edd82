//! Metrics definitions for the BookCircle auth service.
//!
//! Naming follows Prometheus conventions: `bookcircle_` prefix, `_total`
//! suffix for counters.
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `status`: 2 values (success, error)
//! - `error_category`: 4 values (none, invalid, expired, oversized)
//! - `reason`: small fixed sets per metric

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return its render handle.
///
/// Fails if a recorder is already installed in this process; test
/// harnesses fall back to a standalone recorder in that case.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record a token validation result.
///
/// Metric: `bookcircle_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("bookcircle_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record a login attempt outcome.
///
/// Metric: `bookcircle_logins_total`
/// Labels: `status`
pub fn record_login(status: &str) {
    counter!("bookcircle_logins_total", "status" => status.to_string()).increment(1);
}

/// Record a registration outcome.
///
/// Metric: `bookcircle_registrations_total`
/// Labels: `status` (success, conflict, invalid)
pub fn record_registration(status: &str) {
    counter!("bookcircle_registrations_total", "status" => status.to_string()).increment(1);
}

/// Record a token refresh outcome.
///
/// Metric: `bookcircle_token_refreshes_total`
/// Labels: `status`
pub fn record_token_refresh(status: &str) {
    counter!("bookcircle_token_refreshes_total", "status" => status.to_string()).increment(1);
}
