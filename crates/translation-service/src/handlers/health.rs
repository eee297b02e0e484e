//! Liveness endpoint.

use crate::models::HealthResponse;
use axum::Json;
use tracing::instrument;

/// Handler for GET /actuator/health
///
/// Always reports `UP` while the process is serving requests; storage
/// reachability is not probed.
#[instrument(skip_all, name = "ts.health.check")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
    })
}
