//! Request extractors whose rejections go through [`ApiError`].
//!
//! `axum::Json` and `axum::extract::Query` answer bad input with their own
//! plain-text rejections. These wrappers classify the rejection instead, so
//! unreadable bodies get the standard error body.

use crate::errors::{classify_body_error, ApiError, BodyErrorKind};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body extractor.
pub struct AppJson<T>(pub T);

/// Query string extractor.
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(e) => classify_body_error(e),
            _ => BodyErrorKind::Other,
        };
        ApiError::MalformedBody {
            kind,
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let kind = match &rejection {
            QueryRejection::FailedToDeserializeQueryString(e) => classify_body_error(e),
            _ => BodyErrorKind::Other,
        };
        ApiError::MalformedBody {
            kind,
            detail: rejection.body_text(),
        }
    }
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(AppQuery(value))
    }
}
