//! Authentication module for the Translation Service.
//!
//! # Components
//!
//! - `validator` - Injected token validity check (HS256 via `jsonwebtoken`)
//! - `principal` - Authenticated identity built from claims
//! - `introspect` - Validator -> decoder -> principal pipeline

pub mod introspect;
pub mod principal;
pub mod validator;

pub use introspect::TokenIntrospector;
pub use principal::{Principal, PrincipalAttribute};
pub use validator::{HmacJwtValidator, TokenValidator, ValidatorError};
