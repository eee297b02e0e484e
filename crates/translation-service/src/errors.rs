//! Translation Service error types.
//!
//! Every request failure is rendered through this module. `ApiError` covers
//! failures raised after authentication (body parsing, field validation,
//! business rules, storage) and `AuthError` covers bearer-token failures.
//! Both produce the same wire shape:
//!
//! ```json
//! {"code": 1000, "message": "...", "errors": [{"domain": "...", "reason": "...", "message": "..."}]}
//! ```
//!
//! Internal details (storage errors, panics) are logged server-side with
//! `tracing`; stack traces never reach the client.

use crate::observability::metrics::record_error;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::jwt::JwtDecodeError;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Service identifier carried in every error body.
pub const SERVICE_CODE: u32 = 1000;

/// Message returned for every authentication failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Full authentication is required to access this resource";

/// Top-level message for field validation failures.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

/// Top-level message for collection-level constraint failures.
pub const CONSTRAINT_VIOLATION_MESSAGE: &str = "Constraint violation";

/// Top-level message for unreadable request bodies.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid request format";

/// Texts of `chrono::format::ParseError`, matched when the error only
/// survives as a string inside a serde error.
const DATE_TIME_PARSE_MARKERS: [&str; 7] = [
    "input is out of range",
    "no possible date and time matching input",
    "input is not enough for unique date and time",
    "input contains invalid characters",
    "premature end of input",
    "trailing input",
    "bad or unsupported format string",
];

/// serde data errors that describe a value in the wrong format.
const VALUE_FORMAT_MARKERS: [&str; 3] = ["invalid type", "invalid value", "unknown variant"];

// =============================================================================
// Business errors
// =============================================================================

/// Business error codes and their HTTP statuses.
///
/// `NotFound` maps to 400, not 404; clients rely on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    InvalidParam,
    Unauthorized,
}

impl ErrorCode {
    /// Wire name of the code (`NOT_FOUND`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidParam => "INVALID_PARAM",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound | ErrorCode::InvalidParam => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure raised deliberately by the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct BusinessError {
    pub code: ErrorCode,
    pub message: String,
}

impl BusinessError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `NOT_FOUND` for a translation id.
    pub fn translation_not_found(translation_id: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("Translation not found: {translation_id}"),
        )
    }
}

// =============================================================================
// Request errors
// =============================================================================

/// One failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// How an unreadable request body failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyErrorKind {
    /// A value was present but in the wrong format (dates, enums, types).
    Format,
    /// Anything else: syntax errors, missing content type, I/O.
    Other,
}

/// Failures raised while handling an authenticated request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed for {} field(s)", .0.len())]
    FieldValidation(Vec<FieldError>),

    #[error(transparent)]
    Business(#[from] BusinessError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{message}")]
    InvalidArgument {
        message: String,
        cause: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("Malformed request body: {detail}")]
    MalformedBody { kind: BodyErrorKind, detail: String },

    #[error("{0}")]
    Unclassified(String),
}

impl ApiError {
    /// An `InvalidArgument` without an underlying cause.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument {
            message: message.into(),
            cause: None,
        }
    }

    /// Label used for the `ts_errors_total` metric.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::FieldValidation(_) => "field_validation",
            ApiError::Business(_) => "business",
            ApiError::ConstraintViolation(_) => "constraint_violation",
            ApiError::InvalidArgument { .. } => "invalid_argument",
            ApiError::MalformedBody {
                kind: BodyErrorKind::Format,
                ..
            } => "malformed_body_format",
            ApiError::MalformedBody {
                kind: BodyErrorKind::Other,
                ..
            } => "malformed_body",
            ApiError::Unclassified(_) => "unclassified",
        }
    }

    /// Map the failure to its status and wire body.
    pub fn normalize(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::FieldValidation(fields) => {
                let mut fields: Vec<&FieldError> = fields.iter().collect();
                fields.sort_by(|a, b| a.field.cmp(&b.field));
                let errors = fields
                    .into_iter()
                    .map(|f| ErrorInfo {
                        domain: f.field.clone(),
                        reason: ErrorCode::InvalidParam.as_str().to_string(),
                        message: f.message.clone(),
                    })
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(VALIDATION_FAILED_MESSAGE, errors),
                )
            }
            ApiError::Business(err) => business_response(err),
            ApiError::ConstraintViolation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    CONSTRAINT_VIOLATION_MESSAGE,
                    vec![ErrorInfo {
                        domain: String::new(),
                        reason: ErrorCode::InvalidParam.as_str().to_string(),
                        message: message.clone(),
                    }],
                ),
            ),
            ApiError::InvalidArgument { message, cause } => {
                match cause.as_deref().and_then(business_root_cause) {
                    Some(business) => business_response(business),
                    None => (
                        StatusCode::BAD_REQUEST,
                        ErrorResponse::new(message.clone(), Vec::new()),
                    ),
                }
            }
            ApiError::MalformedBody { kind, .. } => {
                let status = match kind {
                    BodyErrorKind::Format => StatusCode::UNPROCESSABLE_ENTITY,
                    BodyErrorKind::Other => StatusCode::BAD_REQUEST,
                };
                (status, ErrorResponse::new(INVALID_FORMAT_MESSAGE, Vec::new()))
            }
            ApiError::Unclassified(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(message.clone(), Vec::new()),
            ),
        }
    }

    fn log(&self) {
        match self {
            ApiError::FieldValidation(fields) => {
                tracing::warn!(target: "ts.errors", field_count = fields.len(), "Request field validation failed");
            }
            ApiError::Business(err) => {
                tracing::warn!(target: "ts.errors", code = %err.code, message = %err.message, "Business error");
            }
            ApiError::ConstraintViolation(message) => {
                tracing::warn!(target: "ts.errors", message = %message, "Constraint violation");
            }
            ApiError::InvalidArgument { message, cause } => {
                tracing::warn!(
                    target: "ts.errors",
                    message = %message,
                    has_cause = cause.is_some(),
                    "Invalid argument"
                );
            }
            ApiError::MalformedBody { kind, detail } => {
                tracing::warn!(target: "ts.errors", kind = ?kind, detail = %detail, "Malformed request body");
            }
            ApiError::Unclassified(message) => {
                tracing::error!(target: "ts.errors", error = %message, "Unhandled error");
            }
        }
    }
}

fn business_response(err: &BusinessError) -> (StatusCode, ErrorResponse) {
    (
        err.code.http_status(),
        ErrorResponse::new(
            err.code.as_str(),
            vec![ErrorInfo {
                domain: String::new(),
                reason: err.code.as_str().to_string(),
                message: err.message.clone(),
            }],
        ),
    )
}

/// Follow `source()` to the deepest error and return it if it is a
/// `BusinessError`.
fn business_root_cause<'a>(
    err: &'a (dyn StdError + Send + Sync + 'static),
) -> Option<&'a BusinessError> {
    let mut current: &(dyn StdError + 'static) = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.downcast_ref::<BusinessError>()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let (status, body) = self.normalize();
        record_error(self.kind(), status.as_u16());
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string),
                })
            })
            .collect();
        ApiError::FieldValidation(fields)
    }
}

/// Classify an unreadable body (or query string) by walking its error chain.
///
/// Date/time parse failures and serde type/value/variant mismatches are
/// `Format`; everything else is `Other`.
pub fn classify_body_error(err: &(dyn StdError + 'static)) -> BodyErrorKind {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.downcast_ref::<chrono::ParseError>().is_some() {
            return BodyErrorKind::Format;
        }
        let text = e.to_string();
        if DATE_TIME_PARSE_MARKERS
            .iter()
            .chain(VALUE_FORMAT_MARKERS.iter())
            .any(|marker| text.contains(marker))
        {
            return BodyErrorKind::Format;
        }
        current = e.source();
    }
    BodyErrorKind::Other
}

// =============================================================================
// Authentication errors
// =============================================================================

/// Bearer-token failures. All render as the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Failed to decode JWT token")]
    MalformedToken,

    #[error("Invalid JWT token")]
    InvalidToken,

    #[error("Missing username in token")]
    MissingIdentity,

    #[error("Missing bearer token")]
    MissingCredentials,
}

impl AuthError {
    /// Label used for introspection and error metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::MissingIdentity => "missing_identity",
            AuthError::MissingCredentials => "missing_credentials",
        }
    }
}

impl From<JwtDecodeError> for AuthError {
    fn from(_: JwtDecodeError) -> Self {
        AuthError::MalformedToken
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(target: "ts.errors", reason = self.as_label(), "Authentication failed");
        record_error(self.as_label(), StatusCode::UNAUTHORIZED.as_u16());

        let body = ErrorResponse::new(UNAUTHORIZED_MESSAGE, Vec::new());
        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

// =============================================================================
// Wire format
// =============================================================================

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub message: String,
    pub errors: Vec<ErrorInfo>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, errors: Vec<ErrorInfo>) -> Self {
        Self {
            code: SERVICE_CODE,
            message: message.into(),
            errors,
        }
    }
}

/// Detail entry inside an [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub domain: String,
    pub reason: String,
    pub message: String,
}
