//! Opaque bearer-token introspection.
//!
//! Validator first, then decode, then build the principal. A token the
//! validator does not accept is never decoded.

use crate::auth::principal::Principal;
use crate::auth::validator::TokenValidator;
use crate::errors::AuthError;
use crate::observability::metrics::record_introspection;
use common::jwt::decode_claims;
use std::sync::Arc;
use tracing::instrument;

/// Turns a bearer token into a [`Principal`].
///
/// Holds no per-request state; one instance serves all requests.
#[derive(Clone)]
pub struct TokenIntrospector {
    validator: Arc<dyn TokenValidator>,
}

impl TokenIntrospector {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    /// Introspect a bearer token.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` - the validator said no, or could not decide
    /// - `MalformedToken` - the token could not be decoded
    /// - `MissingIdentity` - no `sub` or `username` claim
    #[instrument(skip_all, name = "ts.auth.introspect")]
    pub async fn introspect(&self, token: &str) -> Result<Principal, AuthError> {
        let result = self.introspect_inner(token).await;
        match &result {
            Ok(_) => record_introspection("success"),
            Err(e) => record_introspection(e.as_label()),
        }
        result
    }

    async fn introspect_inner(&self, token: &str) -> Result<Principal, AuthError> {
        let valid = match self.validator.validate_jwt_token(token).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(target: "ts.auth", error = %e, "Token validator failed");
                false
            }
        };

        if !valid {
            tracing::debug!(target: "ts.auth", "Token rejected by validator");
            return Err(AuthError::InvalidToken);
        }

        let claims = decode_claims(token).map_err(|e| {
            tracing::debug!(target: "ts.auth", error = %e, "Validated token could not be decoded");
            AuthError::from(e)
        })?;

        let principal = Principal::from_claims(&claims).inspect_err(|_| {
            tracing::debug!(target: "ts.auth", "Token carries no identity claim");
        })?;

        tracing::debug!(
            target: "ts.auth",
            expires_at = %principal.expires_at(),
            "Token introspected successfully"
        );
        Ok(principal)
    }
}
