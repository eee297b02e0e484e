//! Compact token decoding shared across translation service components.
//!
//! This module turns a compact token (`header.payload.signature`) into a
//! [`Claims`] mapping WITHOUT verifying the signature. Signature and expiry
//! checks are the job of an injected validator that runs before decoding.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Error messages are generic; the specific reason is logged at debug level
//! - The `Debug` output of [`Claims`] redacts identity and token values
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{decode_claims, TOKEN_CLAIM};
//!
//! let claims = decode_claims(token)?;
//! let subject = claims.get("sub").and_then(|v| v.as_str());
//! assert!(claims.contains(TOKEN_CLAIM));
//! ```

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes (8KB).
///
/// Typical tokens are a few hundred bytes. Anything larger is rejected
/// before base64 decoding allocates a buffer for it.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Reserved claim name under which the raw token is stored after decoding.
pub const TOKEN_CLAIM: &str = "token";

/// Claim names whose values are hidden from `Debug` output.
const REDACTED_CLAIMS: [&str; 3] = ["sub", "username", TOKEN_CLAIM];

/// base64url engine that accepts segments with or without `=` padding.
const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while decoding a compact token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtDecodeError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("Failed to decode JWT token")]
    TokenTooLarge,

    /// Token is not three segments, or a segment is not base64url JSON.
    #[error("Failed to decode JWT token")]
    MalformedToken,
}

// =============================================================================
// Claims Types
// =============================================================================

/// A single claim value.
///
/// Scalars get their own variant; arrays and objects are kept as
/// `Structured` and are never interpreted by the authentication path.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Structured(Value),
}

impl ClaimValue {
    /// Returns the string payload, if this is a string claim.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the claim as whole epoch seconds.
    ///
    /// Integer numbers and strings holding a base-10 `i64` are accepted.
    /// Fractional numbers, booleans, nulls and structured values are not.
    #[must_use]
    pub fn as_epoch_seconds(&self) -> Option<i64> {
        match self {
            ClaimValue::Number(n) => n.as_i64(),
            ClaimValue::String(s) => s.parse::<i64>().ok(),
            ClaimValue::Null | ClaimValue::Bool(_) | ClaimValue::Structured(_) => None,
        }
    }
}

impl From<Value> for ClaimValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ClaimValue::Null,
            Value::Bool(b) => ClaimValue::Bool(b),
            Value::Number(n) => ClaimValue::Number(n),
            Value::String(s) => ClaimValue::String(s),
            structured @ (Value::Array(_) | Value::Object(_)) => ClaimValue::Structured(structured),
        }
    }
}

/// Claims decoded from a token payload, keyed by claim name.
#[derive(Clone, Default, PartialEq)]
pub struct Claims(BTreeMap<String, ClaimValue>);

impl Claims {
    /// Look up a claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.0.get(name)
    }

    /// Insert or replace a claim.
    pub fn insert(&mut self, name: impl Into<String>, value: ClaimValue) {
        self.0.insert(name.into(), value);
    }

    /// Whether a claim with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over claims in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Claims(
            map.into_iter()
                .map(|(name, value)| (name, ClaimValue::from(value)))
                .collect(),
        )
    }
}

/// Identity-bearing claims and the raw token are redacted.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if REDACTED_CLAIMS.contains(&name.as_str()) {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Decode a compact token into its claims without verifying the signature.
///
/// The header segment must decode to a JSON object, the payload segment must
/// decode to a JSON object, and the signature segment must be present (it
/// is not inspected). On success the raw token is added under
/// [`TOKEN_CLAIM`], replacing any claim of that name in the payload.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - wrong segment count, empty header/payload, bad
///   base64url, or a segment that is not a JSON object
pub fn decode_claims(token: &str) -> Result<Claims, JwtDecodeError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtDecodeError::TokenTooLarge);
    }

    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        tracing::debug!(target: "common.jwt", "Token rejected: expected three segments");
        return Err(JwtDecodeError::MalformedToken);
    };

    if header.is_empty() || payload.is_empty() {
        tracing::debug!(target: "common.jwt", "Token rejected: empty header or payload");
        return Err(JwtDecodeError::MalformedToken);
    }

    decode_segment(header, "header")?;
    let mut claims = Claims::from(decode_segment(payload, "payload")?);
    claims.insert(TOKEN_CLAIM, ClaimValue::String(token.to_string()));

    Ok(claims)
}

/// Decode one base64url segment into a JSON object.
fn decode_segment(segment: &str, name: &'static str) -> Result<Map<String, Value>, JwtDecodeError> {
    let bytes = BASE64_URL.decode(segment).map_err(|e| {
        tracing::debug!(target: "common.jwt", segment = name, error = %e, "Failed to decode base64url");
        JwtDecodeError::MalformedToken
    })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            tracing::debug!(target: "common.jwt", segment = name, "Segment is not a JSON object");
            Err(JwtDecodeError::MalformedToken)
        }
        Err(e) => {
            tracing::debug!(target: "common.jwt", segment = name, error = %e, "Failed to parse segment JSON");
            Err(JwtDecodeError::MalformedToken)
        }
    }
}
