//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for bearer tokens and signing
//! secrets. `Debug` output of a `SecretString` is redacted, so structs that
//! derive `Debug` while holding one stay safe to log.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! let token = SecretString::from("eyJhbGciOiJIUzI1NiJ9.e30.sig");
//! assert!(format!("{token:?}").contains("REDACTED"));
//! assert!(token.expose_secret().starts_with("eyJ"));
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("raw-bearer-token");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("raw-bearer-token"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("hs256-shared-secret");
        assert_eq!(secret.expose_secret(), "hs256-shared-secret");
    }
}
