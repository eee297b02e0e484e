//! Synthetic data loader for load testing.
//!
//! Generates `count` translations with rotating locales and tags and stores
//! them through the bulk path in batches.

use crate::errors::ApiError;
use crate::models::{TranslationCreateRequest, LOCALES, TAGS};
use crate::services::TranslationService;
use tracing::instrument;

/// Documents per bulk request.
pub const SEED_BATCH_SIZE: usize = 1000;

/// The `index`-th synthetic translation. Deterministic for a given index.
pub fn synthetic_request(index: usize) -> TranslationCreateRequest {
    let locale = LOCALES.get(index % LOCALES.len()).copied().unwrap_or("EN");
    let tag = TAGS.get(index % TAGS.len()).copied().unwrap_or("WEB");

    TranslationCreateRequest {
        key: format!("key_{index}"),
        value: format!("Translation {index} for {locale}"),
        locale: locale.to_string(),
        tag: tag.to_string(),
    }
}

/// Load `count` synthetic translations. Returns the number stored.
///
/// # Errors
///
/// Stops at the first failing batch.
#[instrument(skip_all, name = "ts.seed", fields(count = count))]
pub async fn seed_translations(service: &TranslationService, count: usize) -> Result<usize, ApiError> {
    let mut stored = 0;

    while stored < count {
        let batch_end = (stored + SEED_BATCH_SIZE).min(count);
        let batch = (stored..batch_end).map(synthetic_request).collect();
        service.bulk_create(batch).await?;
        stored = batch_end;

        tracing::debug!(target: "ts.seed", stored, total = count, "Seeded batch");
    }

    tracing::info!(target: "ts.seed", stored, "Finished seeding translations");
    Ok(stored)
}
