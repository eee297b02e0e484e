//! Translation business logic.

use crate::errors::{ApiError, BusinessError};
use crate::models::{
    SearchCriteria, TranslationCreateRequest, TranslationDocument, TranslationUpdateRequest,
};
use crate::repositories::TranslationStore;
use std::sync::Arc;
use tracing::instrument;

/// CRUD and search over a [`TranslationStore`].
#[derive(Clone)]
pub struct TranslationService {
    store: Arc<dyn TranslationStore>,
}

impl TranslationService {
    pub fn new(store: Arc<dyn TranslationStore>) -> Self {
        Self { store }
    }

    #[instrument(skip_all, name = "ts.service.create")]
    pub async fn create(
        &self,
        request: TranslationCreateRequest,
    ) -> Result<TranslationDocument, ApiError> {
        let doc = TranslationDocument::from_create_request(request);
        let saved = self.store.save(doc).await?;

        tracing::info!(
            target: "ts.service",
            translation_id = %saved.id,
            key = %saved.key,
            "Created translation"
        );
        Ok(saved)
    }

    /// Replace the editable fields of an existing translation.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` business error if the id is unknown.
    #[instrument(skip_all, name = "ts.service.update", fields(translation_id = %translation_id))]
    pub async fn update(
        &self,
        translation_id: &str,
        request: TranslationUpdateRequest,
    ) -> Result<TranslationDocument, ApiError> {
        let mut doc = self.find(translation_id).await?;
        doc.apply_update(request);
        let saved = self.store.save(doc).await?;

        tracing::info!(target: "ts.service", translation_id = %saved.id, "Updated translation");
        Ok(saved)
    }

    /// # Errors
    ///
    /// `NOT_FOUND` business error if the id is unknown.
    #[instrument(skip_all, name = "ts.service.find", fields(translation_id = %translation_id))]
    pub async fn find(&self, translation_id: &str) -> Result<TranslationDocument, ApiError> {
        self.store
            .find_by_id(translation_id)
            .await?
            .ok_or_else(|| BusinessError::translation_not_found(translation_id).into())
    }

    /// One page of translations matching `criteria`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `page < 0` or `size < 1`.
    #[instrument(skip_all, name = "ts.service.search")]
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        page: i64,
        size: i64,
    ) -> Result<Vec<TranslationDocument>, ApiError> {
        let page = usize::try_from(page)
            .map_err(|_| ApiError::invalid_argument("Page index must not be less than zero"))?;
        let size = match usize::try_from(size) {
            Ok(size) if size >= 1 => size,
            _ => return Err(ApiError::invalid_argument("Page size must not be less than one")),
        };

        let hits = self.store.search(criteria, page, size).await?;

        tracing::info!(target: "ts.service", page, size, hits = hits.len(), "Completed translation search");
        Ok(hits)
    }

    /// Deleting an unknown id succeeds.
    #[instrument(skip_all, name = "ts.service.delete", fields(translation_id = %translation_id))]
    pub async fn delete(&self, translation_id: &str) -> Result<(), ApiError> {
        self.store.delete_by_id(translation_id).await?;
        tracing::info!(target: "ts.service", "Deleted translation");
        Ok(())
    }

    /// Store many translations in one call. Requests must already be validated.
    #[instrument(skip_all, name = "ts.service.bulk_create", fields(count = requests.len()))]
    pub async fn bulk_create(&self, requests: Vec<TranslationCreateRequest>) -> Result<(), ApiError> {
        let docs = requests
            .into_iter()
            .map(TranslationDocument::from_create_request)
            .collect();
        self.store.save_all(docs).await?;
        Ok(())
    }
}
