//! Builder patterns for test bearer tokens
//!
//! Provides a fluent API for JWT claims, signed with HS256 or left unsigned
//! for tests that stub out signature validation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for creating test JWTs
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .sub("alice")
///     .expires_in(3600)
///     .sign(TEST_JWT_SECRET);
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Create a new token builder with `sub = "test-subject"` and a one hour
    /// expiry.
    pub fn new() -> Self {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!("test-subject"));
        claims.insert(
            "exp".to_string(),
            json!((Utc::now() + Duration::seconds(3600)).timestamp()),
        );
        Self { claims }
    }

    /// Set the subject
    pub fn sub(self, subject: &str) -> Self {
        self.claim("sub", json!(subject))
    }

    /// Set the fallback `username` claim
    pub fn username(self, username: &str) -> Self {
        self.claim("username", json!(username))
    }

    /// Set `exp` to an absolute epoch-seconds value
    pub fn exp(self, epoch_seconds: i64) -> Self {
        self.claim("exp", json!(epoch_seconds))
    }

    /// Set expiration in seconds from now (negative for expired tokens)
    pub fn expires_in(self, seconds: i64) -> Self {
        self.exp((Utc::now() + Duration::seconds(seconds)).timestamp())
    }

    /// Remove the subject
    pub fn without_sub(mut self) -> Self {
        self.claims.remove("sub");
        self
    }

    /// Remove the expiry
    pub fn without_exp(mut self) -> Self {
        self.claims.remove("exp");
        self
    }

    /// Set an arbitrary claim
    pub fn claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// The claims as a JSON value
    pub fn build(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Encode and sign with HS256
    pub fn sign(&self, secret: &str) -> String {
        encode(
            &Header::default(),
            &self.build(),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("HS256 encoding of JSON claims cannot fail")
    }

    /// Encode with a placeholder signature. Only useful against a validator
    /// that does not check signatures.
    pub fn unsigned(&self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.build().to_string());
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
