//! Translation Service configuration.
//!
//! Configuration is loaded from environment variables. The JWT secret is
//! redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default tolerance applied to `exp`, in seconds.
pub const DEFAULT_JWT_LEEWAY_SECONDS: u64 = 60;

/// Maximum accepted `exp` tolerance, in seconds.
pub const MAX_JWT_LEEWAY_SECONDS: u64 = 600;

/// Minimum HS256 secret length in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Default search index name.
pub const DEFAULT_ELASTICSEARCH_INDEX: &str = "translations";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Translation Service configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// HS256 shared secret for bearer-token signatures.
    pub jwt_secret: String,

    /// Tolerance applied to `exp` during validation.
    pub jwt_leeway_seconds: u64,

    /// Elasticsearch base URL. `None` selects the in-memory store.
    pub elasticsearch_url: Option<String>,

    /// Index holding translation documents.
    pub elasticsearch_index: String,

    /// Per-request timeout for the HTTP server and the index client.
    pub request_timeout_seconds: u64,

    /// Synthetic translations to load at startup (0 disables seeding).
    pub seed_translations: usize,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("elasticsearch_url", &self.elasticsearch_url)
            .field("elasticsearch_index", &self.elasticsearch_index)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("seed_translations", &self.seed_translations)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid JWT leeway configuration: {0}")]
    InvalidJwtLeeway(String),

    #[error("Invalid request timeout configuration: {0}")]
    InvalidRequestTimeout(String),

    #[error("Invalid seed configuration: {0}")]
    InvalidSeedCount(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let jwt_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?
            .clone();

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "JWT_SECRET must be at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_leeway_seconds = if let Some(value_str) = vars.get("JWT_LEEWAY_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtLeeway(format!(
                    "JWT_LEEWAY_SECONDS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value > MAX_JWT_LEEWAY_SECONDS {
                return Err(ConfigError::InvalidJwtLeeway(format!(
                    "JWT_LEEWAY_SECONDS must not exceed {} seconds, got {}",
                    MAX_JWT_LEEWAY_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_JWT_LEEWAY_SECONDS
        };

        let elasticsearch_url = vars
            .get("ELASTICSEARCH_URL")
            .filter(|url| !url.trim().is_empty())
            .cloned();

        let elasticsearch_index = vars
            .get("ELASTICSEARCH_INDEX")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ELASTICSEARCH_INDEX.to_string());

        let request_timeout_seconds = if let Some(value_str) = vars.get("REQUEST_TIMEOUT_SECONDS")
        {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidRequestTimeout(format!(
                    "REQUEST_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidRequestTimeout(
                    "REQUEST_TIMEOUT_SECONDS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_REQUEST_TIMEOUT_SECONDS
        };

        let seed_translations = match vars.get("SEED_TRANSLATIONS") {
            Some(value_str) => value_str.parse().map_err(|e| {
                ConfigError::InvalidSeedCount(format!(
                    "SEED_TRANSLATIONS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => 0,
        };

        Ok(Config {
            bind_address,
            jwt_secret,
            jwt_leeway_seconds,
            elasticsearch_url,
            elasticsearch_index,
            request_timeout_seconds,
            seed_translations,
        })
    }
}
