//! Bearer-token validity checks.
//!
//! The introspector asks a [`TokenValidator`] whether a token may be trusted
//! before it decodes anything. The shipped implementation verifies an HS256
//! signature and the `exp` claim with `jsonwebtoken`.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only HS256 is accepted
//! - Verification failures are logged at debug level without the token

use async_trait::async_trait;
use common::jwt::MAX_JWT_SIZE_BYTES;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::collections::HashSet;
use thiserror::Error;
use tracing::instrument;

/// The validator could not reach a verdict.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("Token validation unavailable: {0}")]
    Unavailable(String),
}

/// Decides whether a bearer token is valid.
///
/// `Ok(false)` and `Err(_)` are both treated as an invalid token by callers.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate_jwt_token(&self, token: &str) -> Result<bool, ValidatorError>;
}

/// HS256 signature and expiry check against a shared secret.
pub struct HmacJwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl HmacJwtValidator {
    /// Create a validator for tokens signed with `secret`.
    ///
    /// `leeway_seconds` is the tolerance applied to `exp`.
    pub fn new(secret: &[u8], leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;
        // exp is checked when present; a token without it still verifies
        validation.required_spec_claims = HashSet::new();

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[async_trait]
impl TokenValidator for HmacJwtValidator {
    #[instrument(skip_all, name = "ts.auth.validate")]
    async fn validate_jwt_token(&self, token: &str) -> Result<bool, ValidatorError> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(
                target: "ts.auth",
                token_size = token.len(),
                "Token rejected: size exceeds maximum allowed"
            );
            return Ok(false);
        }

        match decode::<serde_json::Value>(token, &self.decoding_key, &self.validation) {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!(target: "ts.auth", error = %e, "Token verification failed");
                Ok(false)
            }
        }
    }
}

/// Mock validators for tests.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy)]
    enum Verdict {
        Accept,
        Reject,
        Fail,
    }

    /// Validator with a fixed verdict that counts its calls.
    pub struct MockTokenValidator {
        verdict: Verdict,
        call_count: AtomicUsize,
    }

    impl MockTokenValidator {
        /// Create a mock that accepts every token.
        pub fn accepting() -> Self {
            Self::with_verdict(Verdict::Accept)
        }

        /// Create a mock that rejects every token.
        pub fn rejecting() -> Self {
            Self::with_verdict(Verdict::Reject)
        }

        /// Create a mock that returns errors.
        pub fn failing() -> Self {
            Self::with_verdict(Verdict::Fail)
        }

        fn with_verdict(verdict: Verdict) -> Self {
            Self {
                verdict,
                call_count: AtomicUsize::new(0),
            }
        }

        /// Get the number of calls made.
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenValidator for MockTokenValidator {
        async fn validate_jwt_token(&self, _token: &str) -> Result<bool, ValidatorError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match self.verdict {
                Verdict::Accept => Ok(true),
                Verdict::Reject => Ok(false),
                Verdict::Fail => Err(ValidatorError::Unavailable(
                    "mock validator failure".to_string(),
                )),
            }
        }
    }
}
