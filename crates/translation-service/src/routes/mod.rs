//! HTTP routes for the Translation Service.
//!
//! Defines the Axum router and application state.

use crate::auth::TokenIntrospector;
use crate::config::Config;
use crate::errors::ApiError;
use crate::handlers;
use crate::middleware::{cors_preflight, http_metrics_middleware, require_auth, AuthState};
use crate::services::TranslationService;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Message carried in the body of a timed-out request.
pub const REQUEST_TIMEOUT_MESSAGE: &str = "Request timed out";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Translation CRUD and search.
    pub translations: Arc<TranslationService>,

    /// Bearer-token introspection for protected routes.
    pub introspector: Arc<TokenIntrospector>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/actuator/health` - Liveness probe - public
/// - `/metrics` - Prometheus metrics endpoint - public
/// - `/v1/translation/...` - Translation endpoints - requires authentication
/// - CORS preflight guard (outermost)
/// - Panic catcher rendering panics as normalized errors
/// - HTTP metrics middleware
/// - TraceLayer for request logging
/// - Request timeout from configuration, answered with a normalized 408
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        introspector: state.introspector.clone(),
    });
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);

    // Public routes (no authentication required)
    let public_routes = Router::new().route("/actuator/health", get(handlers::health_check));

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/v1/translation", post(handlers::create_translation))
        .route(
            "/v1/translation/bulk",
            post(handlers::bulk_create_translations),
        )
        .route(
            "/v1/translation/search",
            get(handlers::search_translations),
        )
        .route(
            "/v1/translation/:translation_id",
            get(handlers::get_translation)
                .put(handlers::update_translation)
                .delete(handlers::delete_translation),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. normalize_timeout - Give the bare 408 an error body
    // 3. TraceLayer - Log request details
    // 4. CatchPanicLayer - Render handler panics as 400 error bodies
    // 5. http_metrics_middleware - Record all responses, panics included
    // 6. cors_preflight - Answer preflights and decorate every response (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(normalize_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(cors_preflight))
}

/// Replace the empty 408 produced by `TimeoutLayer` with an error body.
///
/// No handler answers 408 itself, so the status identifies a timeout.
async fn normalize_timeout(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    let mut response = ApiError::Unclassified(REQUEST_TIMEOUT_MESSAGE.to_string()).into_response();
    *response.status_mut() = StatusCode::REQUEST_TIMEOUT;
    response
}

/// Render a caught panic as an `Unclassified` error.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unexpected error".to_string()
    };

    ApiError::Unclassified(message).into_response()
}
