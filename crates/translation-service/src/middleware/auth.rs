//! Authentication middleware for protected routes.
//!
//! Extracts the Bearer token from the Authorization header, introspects it
//! and injects the resulting [`Principal`] into request extensions.

use crate::auth::TokenIntrospector;
use crate::errors::AuthError;
use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub introspector: Arc<TokenIntrospector>,
}

/// Extract Bearer token from the Authorization header.
///
/// The scheme name is matched case-insensitively.
fn extract_bearer_token(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "ts.middleware.auth", "Missing Authorization header");
            AuthError::MissingCredentials
        })?;

    auth_header
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token)
        .ok_or_else(|| {
            tracing::debug!(target: "ts.middleware.auth", "Invalid Authorization header format");
            AuthError::MissingCredentials
        })
}

/// Authentication middleware.
///
/// OPTIONS requests pass through untouched.
///
/// # Response
///
/// - Returns 401 Unauthorized if token is missing or introspection fails
/// - Continues to next handler with `Principal` in extensions otherwise
#[instrument(skip_all, name = "ts.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = extract_bearer_token(&req)?.to_string();
    let principal = state.introspector.introspect(&token).await?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
