//! Service layer for the Translation Service.
//!
//! # Components
//!
//! - `translation_service` - CRUD, search and bulk create
//! - `seed` - Synthetic data loader

pub mod seed;
pub mod translation_service;

pub use seed::seed_translations;
pub use translation_service::TranslationService;
