//! Translation Service Library
//!
//! Core functionality for the Translation Service, an authenticated HTTP API
//! for managing localized text entries (key, value, locale, tag) backed by a
//! search index.
//!
//! # Architecture
//!
//! Handler -> Service -> Repository:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! Every request first passes the CORS preflight guard. Protected routes then
//! run bearer-token introspection, which produces a [`auth::Principal`].
//! Failures from any layer are rendered by the error normalizer in
//! [`errors`].
//!
//! # Modules
//!
//! - `auth` - Token validation, introspection and the principal
//! - `config` - Service configuration from environment
//! - `errors` - Error types and the error normalizer
//! - `extractors` - JSON and query extractors with classified rejections
//! - `handlers` - HTTP request handlers
//! - `middleware` - CORS, authentication and HTTP metrics middleware
//! - `models` - Documents, request DTOs and search criteria
//! - `observability` - Prometheus metrics
//! - `repositories` - In-memory and Elasticsearch translation stores
//! - `routes` - Axum router setup
//! - `services` - Translation business logic and data seeding

pub mod auth;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
