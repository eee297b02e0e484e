//! Authenticated identity derived from token claims.

use crate::errors::AuthError;
use chrono::{DateTime, Utc};
use common::jwt::{ClaimValue, Claims, TOKEN_CLAIM};
use common::secret::{ExposeSecret, SecretString};
use std::fmt;

/// Attribute name for the expiration instant.
pub const EXP_ATTRIBUTE: &str = "exp";

/// Attribute name for the original bearer token.
pub const TOKEN_ATTRIBUTE: &str = TOKEN_CLAIM;

/// A value exposed through [`Principal::attribute`].
#[derive(Debug, Clone, Copy)]
pub enum PrincipalAttribute<'a> {
    Expiration(DateTime<Utc>),
    Token(&'a SecretString),
}

/// The authenticated caller attached to a request.
///
/// Only built from the claims of a token that already passed validation.
/// Authorities are always empty; the service has no role model.
pub struct Principal {
    username: String,
    expires_at: DateTime<Utc>,
    token: SecretString,
    authorities: Vec<String>,
}

impl Principal {
    /// Build a principal from decoded claims.
    ///
    /// The username comes from `sub`, falling back to `username`; only
    /// string values count. `exp` must hold whole epoch seconds, otherwise
    /// the expiration is the Unix epoch.
    ///
    /// # Errors
    ///
    /// `AuthError::MissingIdentity` if neither identity claim is a string.
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        let username = claims
            .get("sub")
            .and_then(ClaimValue::as_str)
            .or_else(|| claims.get("username").and_then(ClaimValue::as_str))
            .ok_or(AuthError::MissingIdentity)?
            .to_string();

        let expires_at = claims
            .get("exp")
            .and_then(ClaimValue::as_epoch_seconds)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::UNIX_EPOCH);

        let token = claims
            .get(TOKEN_CLAIM)
            .and_then(ClaimValue::as_str)
            .unwrap_or_default();

        Ok(Self {
            username,
            expires_at,
            token: SecretString::from(token.to_string()),
            authorities: Vec::new(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    /// Look up an attribute by name (`exp` or `token`).
    pub fn attribute(&self, name: &str) -> Option<PrincipalAttribute<'_>> {
        match name {
            EXP_ATTRIBUTE => Some(PrincipalAttribute::Expiration(self.expires_at)),
            TOKEN_ATTRIBUTE => Some(PrincipalAttribute::Token(&self.token)),
            _ => None,
        }
    }
}

impl Clone for Principal {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            expires_at: self.expires_at,
            token: SecretString::from(self.token.expose_secret().to_string()),
            authorities: self.authorities.clone(),
        }
    }
}

/// Username and token are redacted.
impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("username", &"[REDACTED]")
            .field("expires_at", &self.expires_at.to_rfc3339())
            .field("token", &"[REDACTED]")
            .field("authorities", &self.authorities)
            .finish()
    }
}
