//! In-process translation store.

use super::{record_outcome, StoreError, TranslationStore};
use crate::models::{SearchCriteria, TranslationDocument};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tokio::sync::RwLock;

/// Stores documents in a `HashMap` behind an async `RwLock`.
///
/// `value` filters behave like a default full-text match: case-insensitive,
/// any query term matching a document term is enough.
#[derive(Default)]
pub struct InMemoryTranslationStore {
    documents: RwLock<HashMap<String, TranslationDocument>>,
}

impl InMemoryTranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches(doc: &TranslationDocument, criteria: &SearchCriteria) -> bool {
    let exact = |filter: &Option<String>, field: &str| filter.as_deref().map_or(true, |f| f == field);

    if !exact(&criteria.key, &doc.key)
        || !exact(&criteria.tag, &doc.tag)
        || !exact(&criteria.locale, &doc.locale)
    {
        return false;
    }

    match &criteria.value {
        Some(query) => {
            let doc_terms = terms(&doc.value);
            terms(query).iter().any(|t| doc_terms.contains(t))
        }
        None => true,
    }
}

#[async_trait]
impl TranslationStore for InMemoryTranslationStore {
    async fn save(&self, doc: TranslationDocument) -> Result<TranslationDocument, StoreError> {
        let start = Instant::now();
        self.documents
            .write()
            .await
            .insert(doc.id.clone(), doc.clone());
        let result = Ok(doc);
        record_outcome("save", start, &result);
        result
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TranslationDocument>, StoreError> {
        let start = Instant::now();
        let result = Ok(self.documents.read().await.get(id).cloned());
        record_outcome("find_by_id", start, &result);
        result
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let start = Instant::now();
        self.documents.write().await.remove(id);
        let result = Ok(());
        record_outcome("delete_by_id", start, &result);
        result
    }

    async fn save_all(&self, docs: Vec<TranslationDocument>) -> Result<(), StoreError> {
        let start = Instant::now();
        let mut documents = self.documents.write().await;
        for doc in docs {
            documents.insert(doc.id.clone(), doc);
        }
        drop(documents);
        let result = Ok(());
        record_outcome("save_all", start, &result);
        result
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
        page: usize,
        size: usize,
    ) -> Result<Vec<TranslationDocument>, StoreError> {
        let start = Instant::now();
        let documents = self.documents.read().await;

        let mut hits: Vec<&TranslationDocument> =
            documents.values().filter(|d| matches(d, criteria)).collect();
        hits.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let result = Ok(hits
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .cloned()
            .collect());
        record_outcome("search", start, &result);
        result
    }
}
