//! Metrics definitions for the Translation Service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `ts_` prefix for Translation Service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: 7 values (parameterized paths plus `/other`)
//! - `status`: 3 values (success, error, timeout)
//! - `status_code`: HTTP status codes the service emits
//! - `outcome`: bounded by `AuthError` variants plus `success`
//! - `kind`: bounded by `ApiError`/`AuthError` variants
//! - `operation`: bounded by `TranslationStore` methods

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("ts_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("ts_store_operation".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set store operation buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metrics and labels:
/// - `ts_http_request_duration_seconds`: `method`, `endpoint`, `status`
/// - `ts_http_requests_total`: `method`, `endpoint`, `status_code`
///
/// `endpoint` may be a route template (`/v1/translation/:translation_id`)
/// or a raw path; both normalize to the same label.
///
/// Captures framework-level responses (404, 405, 415) as well as
/// normalized errors and CORS preflights.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("ts_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("ts_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
///
/// Translation ids are replaced with `{translation_id}`.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/actuator/health" | "/metrics" | "/v1/translation" | "/v1/translation/bulk"
        | "/v1/translation/search" => path.to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

fn normalize_dynamic_endpoint(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("/v1/translation/") {
        if !rest.is_empty() && !rest.contains('/') {
            return "/v1/translation/{translation_id}".to_string();
        }
    }

    // Unknown paths normalized to "/other" to bound cardinality
    "/other".to_string()
}

// ============================================================================
// Authentication Metrics
// ============================================================================

/// Record a bearer-token introspection.
///
/// Metric: `ts_auth_introspections_total`
/// Labels: `outcome` (`success`, `invalid_token`, `malformed_token`,
/// `missing_identity`)
pub fn record_introspection(outcome: &'static str) {
    counter!("ts_auth_introspections_total",
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Store Metrics
// ============================================================================

/// Record a storage call.
///
/// Metric: `ts_store_operation_duration_seconds`, `ts_store_operations_total`
/// Labels: `operation`, `status`
pub fn record_store_operation(operation: &'static str, status: &'static str, duration: Duration) {
    histogram!("ts_store_operation_duration_seconds",
        "operation" => operation
    )
    .record(duration.as_secs_f64());

    counter!("ts_store_operations_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record a normalized error response.
///
/// Metric: `ts_errors_total`
/// Labels: `kind`, `status_code`
pub fn record_error(kind: &'static str, status_code: u16) {
    counter!("ts_errors_total",
        "kind" => kind,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // These run against the no-op recorder; they exercise label handling
    // without asserting on recorded values.

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/actuator/health", 200, Duration::from_millis(5));
        record_http_request("POST", "/v1/translation", 201, Duration::from_millis(20));
        record_http_request("GET", "/v1/translation/abc", 400, Duration::from_millis(8));
        record_http_request("GET", "/v1/translation", 401, Duration::from_millis(1));
        record_http_request("GET", "/v1/translation", 504, Duration::from_secs(30));
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(204), "success");
        assert_eq!(categorize_status_code(400), "error");
        assert_eq!(categorize_status_code(422), "error");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
    }

    #[test]
    fn test_normalize_endpoint_static_paths() {
        assert_eq!(normalize_endpoint("/actuator/health"), "/actuator/health");
        assert_eq!(normalize_endpoint("/metrics"), "/metrics");
        assert_eq!(normalize_endpoint("/v1/translation"), "/v1/translation");
        assert_eq!(normalize_endpoint("/v1/translation/bulk"), "/v1/translation/bulk");
        assert_eq!(
            normalize_endpoint("/v1/translation/search"),
            "/v1/translation/search"
        );
    }

    #[test]
    fn test_normalize_endpoint_translation_id() {
        assert_eq!(
            normalize_endpoint("/v1/translation/2f1c3a9e-57a4-4c38-9a4e-0f2b5d1e7c11"),
            "/v1/translation/{translation_id}"
        );
    }

    #[test]
    fn test_normalize_endpoint_route_template() {
        assert_eq!(
            normalize_endpoint("/v1/translation/:translation_id"),
            "/v1/translation/{translation_id}"
        );
    }

    #[test]
    fn test_normalize_endpoint_unknown() {
        assert_eq!(normalize_endpoint("/"), "/other");
        assert_eq!(normalize_endpoint("/v1/translation/"), "/other");
        assert_eq!(normalize_endpoint("/v1/translation/a/b"), "/other");
        assert_eq!(normalize_endpoint("/admin"), "/other");
    }

    #[test]
    fn test_record_other_metrics() {
        record_introspection("success");
        record_introspection("invalid_token");
        record_store_operation("save", "success", Duration::from_millis(3));
        record_store_operation("search", "error", Duration::from_millis(40));
        record_error("business", 400);
    }
}
