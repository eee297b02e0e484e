//! Error normalization integration tests.
//!
//! Unreadable bodies through the real router, plus a nested date parse
//! failure through a router built on the same extractor.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use axum::{body::Body, http::Request, routing::post, Router};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tower::ServiceExt;
use translation_service::extractors::AppJson;
use ts_test_utils::{ErrorBodyAssertions, TestTokenBuilder, TestTranslationServer, TEST_JWT_SECRET};

#[derive(Deserialize)]
#[allow(dead_code)]
struct Window {
    starts_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Schedule {
    name: String,
    window: Window,
}

async fn schedule(AppJson(_): AppJson<Schedule>) -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

async fn post_raw(server: &TestTranslationServer, content_type: Option<&str>, body: &str) -> Result<reqwest::Response> {
    let token = TestTokenBuilder::new().sub("alice").sign(TEST_JWT_SECRET);
    let mut request = reqwest::Client::new()
        .post(format!("{}/v1/translation", server.url()))
        .bearer_auth(token)
        .body(body.to_string());
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    Ok(request.send().await?)
}

#[tokio::test]
async fn test_nested_date_parse_failure_is_422() -> Result<()> {
    let app = Router::new().route("/schedule", post(schedule));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/schedule")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"name":"launch","window":{"starts_at":"2024-02-30T25:00:00Z"}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    body.assert_error_message("Invalid request format")
        .assert_error_count(0);
    Ok(())
}

#[tokio::test]
async fn test_wrong_value_type_is_422() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;

    let response = post_raw(
        &server,
        Some("application/json"),
        r#"{"key":42,"value":"v","locale":"EN","tag":"WEB"}"#,
    )
    .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await?;
    body.assert_error_message("Invalid request format")
        .assert_error_count(0);
    Ok(())
}

#[tokio::test]
async fn test_json_syntax_error_is_400() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;

    let response = post_raw(&server, Some("application/json"), r#"{"key":"#).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_message("Invalid request format")
        .assert_error_count(0);
    Ok(())
}

#[tokio::test]
async fn test_missing_content_type_is_400() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;

    let response = post_raw(&server, None, r#"{"key":"k"}"#).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_message("Invalid request format");
    Ok(())
}

#[tokio::test]
async fn test_malformed_query_is_400() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;
    let token = TestTokenBuilder::new().sub("alice").sign(TEST_JWT_SECRET);

    let response = reqwest::Client::new()
        .get(format!("{}/v1/translation/search?page=first", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_message("Invalid request format");
    Ok(())
}

#[tokio::test]
async fn test_error_bodies_never_leak_internal_detail() -> Result<()> {
    let server = TestTranslationServer::spawn().await?;

    let response = post_raw(&server, Some("application/json"), "[1,2").await?;

    let text = response.text().await?;
    assert!(!text.contains("line"));
    assert!(!text.contains("column"));
    Ok(())
}
