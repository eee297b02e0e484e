//! HTTP request handlers for the Translation Service.

pub mod health;
pub mod metrics;
pub mod translations;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use translations::{
    bulk_create_translations, create_translation, delete_translation, get_translation,
    search_translations, update_translation,
};
