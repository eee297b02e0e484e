//! Observability module for the Translation Service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
