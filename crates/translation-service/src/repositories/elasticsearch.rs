//! Elasticsearch-backed translation store.
//!
//! Talks to the document, bulk and search REST APIs directly with `reqwest`.
//! Writes use `refresh=wait_for` so a document is searchable once the call
//! returns.

use super::{record_outcome, StoreError, TranslationStore};
use crate::models::{SearchCriteria, TranslationDocument};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::instrument;

/// Index mapping: exact-match fields are keywords, `value` is analyzed text.
fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": {"type": "keyword"},
                "key": {"type": "keyword"},
                "value": {"type": "text"},
                "locale": {"type": "keyword"},
                "tag": {"type": "keyword"},
                "createdAt": {"type": "long"},
                "updatedAt": {"type": "long"}
            }
        }
    })
}

/// Build the `_search` request body.
///
/// `key`, `tag` and `locale` become `term` filters, `value` a `match` query.
/// No filters selects everything. Results are ordered by `createdAt`.
pub fn build_search_query(criteria: &SearchCriteria, page: usize, size: usize) -> Value {
    let filters: Vec<Value> = [
        ("key", &criteria.key),
        ("tag", &criteria.tag),
        ("locale", &criteria.locale),
    ]
    .into_iter()
    .filter_map(|(field, filter)| filter.as_ref().map(|v| json!({"term": {field: v}})))
    .collect();

    let query = if criteria.is_empty() {
        json!({"match_all": {}})
    } else {
        let must: Vec<Value> = criteria
            .value
            .iter()
            .map(|v| json!({"match": {"value": v}}))
            .collect();
        json!({"bool": {"filter": filters, "must": must}})
    };

    json!({
        "query": query,
        "from": page.saturating_mul(size),
        "size": size,
        "sort": [{"createdAt": {"order": "asc"}}, {"id": {"order": "asc"}}]
    })
}

#[derive(Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<TranslationDocument>,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: TranslationDocument,
}

#[derive(Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

/// Store backed by an Elasticsearch index.
pub struct ElasticsearchTranslationStore {
    client: Client,
    base_url: Url,
    index: String,
}

impl ElasticsearchTranslationStore {
    /// Create a store for `index` on the cluster at `base_url`.
    ///
    /// # Errors
    ///
    /// `StoreError::Transport` if `base_url` is not an absolute HTTP URL or
    /// the HTTP client cannot be built.
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Transport(format!("invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Transport(format!(
                "invalid base URL {base_url}: not a hierarchical URL"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            index: index.to_string(),
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Base URL extended with `segments`, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL of a single document. `None` for ids that cannot name a path
    /// segment (`""`, `.`, `..`); no document is stored under them.
    fn doc_url(&self, id: &str) -> Option<Url> {
        if matches!(id, "" | "." | "..") {
            return None;
        }
        Some(self.endpoint(&[self.index.as_str(), "_doc", id]))
    }

    /// Create the index with its mapping if it does not exist yet.
    #[instrument(skip_all, name = "ts.store.ensure_index")]
    pub async fn ensure_index(&self) -> Result<(), StoreError> {
        let url = self.endpoint(&[self.index.as_str()]);
        let response = self.client.head(url.clone()).send().await.map_err(transport)?;

        if response.status().is_success() {
            tracing::debug!(target: "ts.store", index = %self.index, "Index already exists");
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(index_error(response).await);
        }

        let response = self
            .client
            .put(url)
            .json(&index_mapping())
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(index_error(response).await);
        }

        tracing::info!(target: "ts.store", index = %self.index, "Created search index");
        Ok(())
    }

    async fn save_inner(&self, doc: TranslationDocument) -> Result<TranslationDocument, StoreError> {
        let url = self
            .doc_url(&doc.id)
            .ok_or_else(|| StoreError::InvalidId(doc.id.clone()))?;
        let response = self
            .client
            .put(url)
            .query(&[("refresh", "wait_for")])
            .json(&doc)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(index_error(response).await);
        }
        Ok(doc)
    }

    async fn find_inner(&self, id: &str) -> Result<Option<TranslationDocument>, StoreError> {
        let Some(url) = self.doc_url(id) else {
            return Ok(None);
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(index_error(response).await);
        }

        let body: GetResponse = response.json().await.map_err(decode)?;
        Ok(body.source.filter(|_| body.found))
    }

    async fn delete_inner(&self, id: &str) -> Result<(), StoreError> {
        let Some(url) = self.doc_url(id) else {
            return Ok(());
        };
        let response = self
            .client
            .delete(url)
            .query(&[("refresh", "wait_for")])
            .send()
            .await
            .map_err(transport)?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(index_error(response).await)
        }
    }

    async fn save_all_inner(&self, docs: Vec<TranslationDocument>) -> Result<(), StoreError> {
        if docs.is_empty() {
            return Ok(());
        }

        let mut body = String::new();
        for doc in &docs {
            let action = json!({"index": {"_index": self.index, "_id": doc.id}});
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&serde_json::to_string(doc).map_err(decode)?);
            body.push('\n');
        }

        let response = self
            .client
            .post(self.endpoint(&["_bulk"]))
            .query(&[("refresh", "wait_for")])
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(index_error(response).await);
        }

        let result: BulkResponse = response.json().await.map_err(decode)?;
        if result.errors {
            let failed = result
                .items
                .iter()
                .filter(|item| {
                    item.as_object()
                        .and_then(|o| o.values().next())
                        .is_some_and(|action| action.get("error").is_some())
                })
                .count();
            tracing::warn!(target: "ts.store", failed, total = docs.len(), "Bulk indexing reported failures");
            return Err(StoreError::BulkFailed(failed));
        }
        Ok(())
    }

    async fn search_inner(
        &self,
        criteria: &SearchCriteria,
        page: usize,
        size: usize,
    ) -> Result<Vec<TranslationDocument>, StoreError> {
        let query = build_search_query(criteria, page, size);
        tracing::debug!(target: "ts.store", query = %query, "Executing search");

        let response = self
            .client
            .post(self.endpoint(&[self.index.as_str(), "_search"]))
            .json(&query)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(index_error(response).await);
        }

        let body: SearchResponse = response.json().await.map_err(decode)?;
        Ok(body.hits.hits.into_iter().map(|hit| hit.source).collect())
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    tracing::error!(target: "ts.store", error = %err, "Search index request failed");
    StoreError::Transport(err.to_string())
}

fn decode(err: impl std::fmt::Display) -> StoreError {
    tracing::error!(target: "ts.store", error = %err, "Failed to decode search index payload");
    StoreError::Decode(err.to_string())
}

async fn index_error(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Index { status, body }
}

#[async_trait]
impl TranslationStore for ElasticsearchTranslationStore {
    #[instrument(skip_all, name = "ts.store.save")]
    async fn save(&self, doc: TranslationDocument) -> Result<TranslationDocument, StoreError> {
        let start = Instant::now();
        let result = self.save_inner(doc).await;
        record_outcome("save", start, &result);
        result
    }

    #[instrument(skip_all, name = "ts.store.find_by_id")]
    async fn find_by_id(&self, id: &str) -> Result<Option<TranslationDocument>, StoreError> {
        let start = Instant::now();
        let result = self.find_inner(id).await;
        record_outcome("find_by_id", start, &result);
        result
    }

    #[instrument(skip_all, name = "ts.store.delete_by_id")]
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.delete_inner(id).await;
        record_outcome("delete_by_id", start, &result);
        result
    }

    #[instrument(skip_all, name = "ts.store.save_all")]
    async fn save_all(&self, docs: Vec<TranslationDocument>) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.save_all_inner(docs).await;
        record_outcome("save_all", start, &result);
        result
    }

    #[instrument(skip_all, name = "ts.store.search")]
    async fn search(
        &self,
        criteria: &SearchCriteria,
        page: usize,
        size: usize,
    ) -> Result<Vec<TranslationDocument>, StoreError> {
        let start = Instant::now();
        let result = self.search_inner(criteria, page, size).await;
        record_outcome("search", start, &result);
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_criteria_is_match_all() {
        let query = build_search_query(&SearchCriteria::default(), 0, 20);

        assert_eq!(query["query"], json!({"match_all": {}}));
        assert_eq!(query["from"], 0);
        assert_eq!(query["size"], 20);
    }

    #[test]
    fn test_filters_and_value_match() {
        let criteria = SearchCriteria::new(Some("greeting"), Some("WEB"), Some("EN"), Some("hello"));

        let query = build_search_query(&criteria, 2, 10);

        assert_eq!(
            query["query"]["bool"]["filter"],
            json!([
                {"term": {"key": "greeting"}},
                {"term": {"tag": "WEB"}},
                {"term": {"locale": "EN"}}
            ])
        );
        assert_eq!(
            query["query"]["bool"]["must"],
            json!([{"match": {"value": "hello"}}])
        );
        assert_eq!(query["from"], 20);
    }

    #[test]
    fn test_value_only() {
        let criteria = SearchCriteria::new(None, None, None, Some("bonjour"));

        let query = build_search_query(&criteria, 0, 5);

        assert_eq!(query["query"]["bool"]["filter"], json!([]));
        assert_eq!(
            query["query"]["bool"]["must"],
            json!([{"match": {"value": "bonjour"}}])
        );
    }

    fn store(base_url: &str) -> ElasticsearchTranslationStore {
        ElasticsearchTranslationStore::new(base_url, "translations", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let store = store("http://es:9200/");
        assert_eq!(
            store.doc_url("abc").unwrap().as_str(),
            "http://es:9200/translations/_doc/abc"
        );
        assert_eq!(store.index(), "translations");
    }

    #[test]
    fn test_base_path_prefix_kept() {
        let store = store("http://proxy:8080/es");
        assert_eq!(
            store.endpoint(&["_bulk"]).as_str(),
            "http://proxy:8080/es/_bulk"
        );
    }

    #[test]
    fn test_doc_id_is_one_encoded_segment() {
        let store = store("http://es:9200");

        assert_eq!(
            store.doc_url("../../translations").unwrap().as_str(),
            "http://es:9200/translations/_doc/..%2F..%2Ftranslations"
        );
        let url = store.doc_url("a/b?x=1#frag").unwrap();
        assert_eq!(url.path(), "/translations/_doc/a%2Fb%3Fx=1%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_dot_ids_have_no_document_url() {
        let store = store("http://es:9200");
        assert!(store.doc_url(".").is_none());
        assert!(store.doc_url("..").is_none());
        assert!(store.doc_url("").is_none());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result =
            ElasticsearchTranslationStore::new("not a url", "translations", Duration::from_secs(5));
        assert!(matches!(result, Err(StoreError::Transport(_))));
    }
}
