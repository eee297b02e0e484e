//! Translation handlers.
//!
//! - `POST /v1/translation` - Create translation
//! - `POST /v1/translation/bulk` - Create many translations
//! - `GET /v1/translation/search` - Search translations
//! - `GET /v1/translation/{translation_id}` - Get translation
//! - `PUT /v1/translation/{translation_id}` - Update translation
//! - `DELETE /v1/translation/{translation_id}` - Delete translation
//!
//! All routes sit behind `require_auth`. Bodies go through [`AppJson`] so
//! unreadable input is classified by the error normalizer.

use crate::errors::ApiError;
use crate::extractors::{AppJson, AppQuery};
use crate::models::{
    SearchParams, TranslationCreateRequest, TranslationDocument, TranslationUpdateRequest,
};
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

/// Handler for POST /v1/translation
///
/// # Response
///
/// - 201 Created: stored document
/// - 400 Bad Request: field validation failed or unreadable body
/// - 422 Unprocessable Entity: a value had the wrong format
#[instrument(
    skip_all,
    name = "ts.translation.create",
    fields(method = "POST", endpoint = "/v1/translation")
)]
pub async fn create_translation(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<TranslationCreateRequest>,
) -> Result<(StatusCode, Json<TranslationDocument>), ApiError> {
    request.validate()?;
    let doc = state.translations.create(request).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// Handler for PUT /v1/translation/{translation_id}
///
/// Unknown ids answer `NOT_FOUND` with status 400.
#[instrument(
    skip_all,
    name = "ts.translation.update",
    fields(method = "PUT", endpoint = "/v1/translation/{translation_id}")
)]
pub async fn update_translation(
    State(state): State<Arc<AppState>>,
    Path(translation_id): Path<String>,
    AppJson(request): AppJson<TranslationUpdateRequest>,
) -> Result<Json<TranslationDocument>, ApiError> {
    request.validate()?;
    let doc = state.translations.update(&translation_id, request).await?;
    Ok(Json(doc))
}

/// Handler for GET /v1/translation/{translation_id}
#[instrument(
    skip_all,
    name = "ts.translation.get",
    fields(method = "GET", endpoint = "/v1/translation/{translation_id}")
)]
pub async fn get_translation(
    State(state): State<Arc<AppState>>,
    Path(translation_id): Path<String>,
) -> Result<Json<TranslationDocument>, ApiError> {
    let doc = state.translations.find(&translation_id).await?;
    Ok(Json(doc))
}

/// Handler for GET /v1/translation/search
///
/// Filters: `key`, `tag`, `locale` (exact) and `value` (full text). Paging
/// with `page` (default 0) and `size` (default 20).
#[instrument(
    skip_all,
    name = "ts.translation.search",
    fields(method = "GET", endpoint = "/v1/translation/search")
)]
pub async fn search_translations(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<Vec<TranslationDocument>>, ApiError> {
    let hits = state
        .translations
        .search(&params.criteria(), params.page, params.size)
        .await?;
    Ok(Json(hits))
}

/// Handler for DELETE /v1/translation/{translation_id}
///
/// Answers 204 whether or not the id existed.
#[instrument(
    skip_all,
    name = "ts.translation.delete",
    fields(method = "DELETE", endpoint = "/v1/translation/{translation_id}")
)]
pub async fn delete_translation(
    State(state): State<Arc<AppState>>,
    Path(translation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.translations.delete(&translation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /v1/translation/bulk
///
/// The body is a JSON array of create requests. The list is validated as a
/// whole: any invalid item rejects the request with a single constraint
/// violation and nothing is stored.
#[instrument(
    skip_all,
    name = "ts.translation.bulk_create",
    fields(method = "POST", endpoint = "/v1/translation/bulk")
)]
pub async fn bulk_create_translations(
    State(state): State<Arc<AppState>>,
    AppJson(requests): AppJson<Vec<TranslationCreateRequest>>,
) -> Result<StatusCode, ApiError> {
    validate_bulk(&requests)?;
    state.translations.bulk_create(requests).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Collect every item failure as `requests[i].field: message`.
fn validate_bulk(requests: &[TranslationCreateRequest]) -> Result<(), ApiError> {
    let mut violations = Vec::new();

    for (index, request) in requests.iter().enumerate() {
        let Err(errors) = request.validate() else {
            continue;
        };
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        for (field, errs) in fields {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map_or_else(|| err.code.to_string(), ToString::to_string);
                violations.push(format!("requests[{index}].{field}: {message}"));
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ConstraintViolation(violations.join(", ")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn request(key: &str, locale: &str) -> TranslationCreateRequest {
        TranslationCreateRequest {
            key: key.to_string(),
            value: "text".to_string(),
            locale: locale.to_string(),
            tag: "WEB".to_string(),
        }
    }

    #[test]
    fn test_validate_bulk_accepts_valid_list() {
        assert!(validate_bulk(&[request("a", "EN"), request("b", "FR")]).is_ok());
        assert!(validate_bulk(&[]).is_ok());
    }

    #[test]
    fn test_validate_bulk_reports_item_index() {
        let err = validate_bulk(&[request("a", "EN"), request("", "XX")]).unwrap_err();

        let ApiError::ConstraintViolation(message) = err else {
            unreachable!("expected constraint violation");
        };
        assert_eq!(
            message,
            "requests[1].key: key can't be null or empty, requests[1].locale: Invalid locale"
        );
    }
}
