//! Prometheus metrics for formsmith-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const OPERATIONS_TOTAL: &str = "formsmith_operations_total";
const SESSIONS_ACTIVE: &str = "formsmith_sessions_active";
const FORM_FIELDS_TOTAL: &str = "formsmith_form_fields_total";
const VALIDATION_FAILURES_TOTAL: &str = "formsmith_validation_failures_total";
const IMPORTS_TOTAL: &str = "formsmith_imports_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record a builder operation.
///
/// # Arguments
///
/// * `operation` - Operation name (e.g., "create_field", "delete_step")
/// * `success` - Whether the operation succeeded
pub fn record_operation(operation: &str, success: bool) {
    counter!(
        OPERATIONS_TOTAL,
        "operation" => operation.to_string(),
        "success" => success.to_string()
    )
    .increment(1);
}

/// Update the active session count.
pub fn set_sessions(count: usize) {
    gauge!(SESSIONS_ACTIVE).set(count as f64);
}

/// Update the field count of a session's form.
pub fn set_form_fields(session_id: &str, count: usize) {
    gauge!(
        FORM_FIELDS_TOTAL,
        "session" => session_id.to_string()
    )
    .set(count as f64);
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `validation_type` - Type of validation that failed (session_id, name, import, etc.)
pub fn record_validation_failure(validation_type: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "type" => validation_type.to_string()
    )
    .increment(1);
}

/// Record a document import attempt.
///
/// # Arguments
///
/// * `success` - Whether the import was applied
pub fn record_import(success: bool) {
    counter!(
        IMPORTS_TOTAL,
        "success" => success.to_string()
    )
    .increment(1);
}
