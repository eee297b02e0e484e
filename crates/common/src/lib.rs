//! Common utilities and types shared across translation service components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for compact token decoding (claims, size limits)
pub mod jwt;
