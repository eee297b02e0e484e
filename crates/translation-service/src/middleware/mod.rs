//! Middleware for the Translation Service.
//!
//! # Components
//!
//! - `auth` - Bearer-token authentication for protected routes
//! - `cors` - CORS preflight guard (outermost layer)
//! - `http_metrics` - HTTP request metrics middleware

pub mod auth;
pub mod cors;
pub mod http_metrics;

pub use auth::{require_auth, AuthState};
pub use cors::cors_preflight;
pub use http_metrics::http_metrics_middleware;
