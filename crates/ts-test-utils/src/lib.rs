//! # TS Test Utilities
//!
//! Shared test utilities for the Translation Service.
//!
//! This crate provides:
//! - Server test harness (`TestTranslationServer` for E2E tests)
//! - Token builder (`TestTokenBuilder`) for signed and unsigned bearer tokens
//! - Error body assertions (`ErrorBodyAssertions`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ts_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestTranslationServer::spawn().await?;
//!     let token = TestTokenBuilder::new().sub("alice").sign(TEST_JWT_SECRET);
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/v1/translation/search", server.url()))
//!         .bearer_auth(token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use server_harness::*;
pub use token_builders::*;
