//! Request metrics for every response, including framework rejections
//! (404, 405, 415) and normalized errors.
//!
//! The `endpoint` label comes from the matched route template, so
//! `/v1/translation/:translation_id` is one series whatever the id. Requests
//! that matched no route fall back to the raw path, which
//! `normalize_endpoint` folds into `/other`.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

fn endpoint_of(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str)
        .to_string()
}

/// Record method, endpoint, status code and duration of the response.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = endpoint_of(&request);

    let response = next.run(request).await;

    record_http_request(&method, &endpoint, response.status().as_u16(), start.elapsed());

    response
}
