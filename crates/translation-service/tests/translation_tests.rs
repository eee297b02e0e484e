//! Translation endpoint integration tests.
//!
//! Exercises CRUD, search and bulk create against a spawned server with the
//! in-memory store.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use translation_service::models::TranslationDocument;
use ts_test_utils::{ErrorBodyAssertions, TestTokenBuilder, TestTranslationServer, TEST_JWT_SECRET};

struct Client {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl Client {
    fn new(server: &TestTranslationServer) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("{}/v1/translation", server.url()),
            token: TestTokenBuilder::new().sub("alice").sign(TEST_JWT_SECRET),
        }
    }

    async fn create(&self, body: Value) -> Result<reqwest::Response> {
        Ok(self
            .http
            .post(&self.base)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?)
    }

    async fn create_ok(&self, key: &str, locale: &str, tag: &str) -> Result<TranslationDocument> {
        let response = self
            .create(json!({"key": key, "value": format!("{key} in {locale}"), "locale": locale, "tag": tag}))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        Ok(response.json().await?)
    }

    async fn get(&self, id: &str) -> Result<reqwest::Response> {
        Ok(self
            .http
            .get(format!("{}/{}", self.base, id))
            .bearer_auth(&self.token)
            .send()
            .await?)
    }

    async fn search(&self, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        Ok(self
            .http
            .get(format!("{}/search", self.base))
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await?)
    }
}

#[tokio::test]
async fn test_create_and_get_translation() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);

    let created = client.create_ok("greeting", "EN", "WEB").await?;
    assert_eq!(created.key, "greeting");
    assert_eq!(created.created_at, created.updated_at);

    let response = client.get(&created.id).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: TranslationDocument = response.json().await?;
    assert_eq!(fetched, created);
    Ok(())
}

#[tokio::test]
async fn test_create_validation_errors_sorted_by_field() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);

    let response = client
        .create(json!({"key": "", "value": "Hello", "locale": "XX", "tag": "WEB"}))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_message("Validation failed")
        .assert_error_count(2)
        .assert_domain(0, "key")
        .assert_reason(0, "INVALID_PARAM")
        .assert_domain(1, "locale");
    assert_eq!(body["errors"][0]["message"], "key can't be null or empty");
    assert_eq!(body["errors"][1]["message"], "Invalid locale");
    Ok(())
}

#[tokio::test]
async fn test_create_null_field_is_validation_error() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);

    let response = client
        .create(json!({"key": null, "value": "v", "locale": "EN", "tag": "WEB"}))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_message("Validation failed")
        .assert_error_count(1)
        .assert_domain(0, "key")
        .assert_reason(0, "INVALID_PARAM");
    assert_eq!(body["errors"][0]["message"], "key can't be null or empty");
    Ok(())
}

#[tokio::test]
async fn test_get_missing_translation_is_not_found_400() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);

    let response = client.get("does-not-exist").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_message("NOT_FOUND")
        .assert_error_count(1)
        .assert_domain(0, "")
        .assert_reason(0, "NOT_FOUND");
    assert_eq!(
        body["errors"][0]["message"],
        "Translation not found: does-not-exist"
    );
    Ok(())
}

#[tokio::test]
async fn test_update_translation() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);
    let created = client.create_ok("greeting", "EN", "WEB").await?;

    let response = client
        .http
        .put(format!("{}/{}", client.base, created.id))
        .bearer_auth(&client.token)
        .json(&json!({"key": "greeting", "value": "Hej", "locale": "SV", "tag": "MOBILE"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let updated: TranslationDocument = response.json().await?;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.value, "Hej");
    assert_eq!(updated.locale, "SV");
    assert_eq!(updated.created_at, created.created_at);
    Ok(())
}

#[tokio::test]
async fn test_update_uses_update_messages_and_missing_id() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);

    let invalid = client
        .http
        .put(format!("{}/any", client.base))
        .bearer_auth(&client.token)
        .json(&json!({"key": "k", "value": "v", "locale": "EN", "tag": "TV"}))
        .send()
        .await?;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let body: Value = invalid.json().await?;
    assert_eq!(body["errors"][0]["message"], "Invalid tag specified");

    let missing = client
        .http
        .put(format!("{}/missing", client.base))
        .bearer_auth(&client.token)
        .json(&json!({"key": "k", "value": "v", "locale": "EN", "tag": "WEB"}))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    let body: Value = missing.json().await?;
    body.assert_error_message("NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn test_delete_is_idempotent() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);
    let created = client.create_ok("greeting", "EN", "WEB").await?;

    for _ in 0..2 {
        let response = client
            .http
            .delete(format!("{}/{}", client.base, created.id))
            .bearer_auth(&client.token)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    assert_eq!(client.get(&created.id).await?.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_search_filters_and_pagination() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);
    client.create_ok("greeting", "EN", "WEB").await?;
    client.create_ok("greeting", "FR", "WEB").await?;
    client.create_ok("farewell", "EN", "MOBILE").await?;

    let all: Vec<TranslationDocument> = client.search(&[]).await?.json().await?;
    assert_eq!(all.len(), 3);

    let by_key: Vec<TranslationDocument> =
        client.search(&[("key", "greeting")]).await?.json().await?;
    assert_eq!(by_key.len(), 2);

    let by_key_and_locale: Vec<TranslationDocument> = client
        .search(&[("key", "greeting"), ("locale", "FR")])
        .await?
        .json()
        .await?;
    assert_eq!(by_key_and_locale.len(), 1);
    assert_eq!(by_key_and_locale[0].locale, "FR");

    let blank_filter: Vec<TranslationDocument> =
        client.search(&[("tag", "")]).await?.json().await?;
    assert_eq!(blank_filter.len(), 3);

    let second_page: Vec<TranslationDocument> = client
        .search(&[("page", "1"), ("size", "2")])
        .await?
        .json()
        .await?;
    assert_eq!(second_page.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_search_rejects_invalid_pagination() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);

    let negative_page = client.search(&[("page", "-1")]).await?;
    assert_eq!(negative_page.status(), StatusCode::BAD_REQUEST);
    let body: Value = negative_page.json().await?;
    body.assert_error_message("Page index must not be less than zero")
        .assert_error_count(0);

    let zero_size = client.search(&[("size", "0")]).await?;
    assert_eq!(zero_size.status(), StatusCode::BAD_REQUEST);
    let body: Value = zero_size.json().await?;
    body.assert_error_message("Page size must not be less than one");
    Ok(())
}

#[tokio::test]
async fn test_bulk_create() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);

    let response = client
        .http
        .post(format!("{}/bulk", client.base))
        .bearer_auth(&client.token)
        .json(&json!([
            {"key": "a", "value": "A", "locale": "EN", "tag": "WEB"},
            {"key": "b", "value": "B", "locale": "DE", "tag": "DESKTOP"}
        ]))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let stored: Vec<TranslationDocument> = client.search(&[]).await?.json().await?;
    assert_eq!(stored.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bulk_create_rejects_whole_list() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let client = Client::new(&server);

    let response = client
        .http
        .post(format!("{}/bulk", client.base))
        .bearer_auth(&client.token)
        .json(&json!([
            {"key": "a", "value": "A", "locale": "EN", "tag": "WEB"},
            {"key": "b", "value": "", "locale": "EN", "tag": "WEB"}
        ]))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_message("Constraint violation")
        .assert_error_count(1)
        .assert_reason(0, "INVALID_PARAM");
    assert_eq!(
        body["errors"][0]["message"],
        "requests[1].value: value can't be null or empty"
    );

    let stored: Vec<TranslationDocument> = client.search(&[]).await?.json().await?;
    assert!(stored.is_empty());
    Ok(())
}
