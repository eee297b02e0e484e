//! Storage layer for translation documents.
//!
//! # Components
//!
//! - `memory` - In-process store used when no search index is configured
//! - `elasticsearch` - Elasticsearch over HTTP

pub mod elasticsearch;
pub mod memory;

pub use elasticsearch::ElasticsearchTranslationStore;
pub use memory::InMemoryTranslationStore;

use crate::errors::ApiError;
use crate::models::{SearchCriteria, TranslationDocument};
use crate::observability::metrics::record_store_operation;
use async_trait::async_trait;
use std::time::Instant;
use thiserror::Error;

/// Storage failures. Rendered to clients as unclassified errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Search index request failed: {0}")]
    Transport(String),

    #[error("Search index returned status {status}")]
    Index { status: u16, body: String },

    #[error("Failed to decode search index response: {0}")]
    Decode(String),

    #[error("Bulk indexing failed for {0} document(s)")]
    BulkFailed(usize),

    #[error("Document id cannot be addressed: {0:?}")]
    InvalidId(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if let StoreError::Index { status, body } = &err {
            tracing::error!(target: "ts.store", status, body = %body, "Search index rejected request");
        }
        ApiError::Unclassified(err.to_string())
    }
}

/// Persistence contract for translation documents.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Insert or replace a document by id.
    async fn save(&self, doc: TranslationDocument) -> Result<TranslationDocument, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<TranslationDocument>, StoreError>;

    /// Deleting an unknown id is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;

    async fn save_all(&self, docs: Vec<TranslationDocument>) -> Result<(), StoreError>;

    /// One page of matching documents, ordered by creation time.
    async fn search(
        &self,
        criteria: &SearchCriteria,
        page: usize,
        size: usize,
    ) -> Result<Vec<TranslationDocument>, StoreError>;
}

/// Record duration and outcome of a store call.
pub(crate) fn record_outcome<T>(operation: &'static str, start: Instant, result: &Result<T, StoreError>) {
    let status = if result.is_ok() { "success" } else { "error" };
    record_store_operation(operation, status, start.elapsed());
}
