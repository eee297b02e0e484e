//! Data models for the Translation Service.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Supported locales. Matching is case-sensitive.
pub const LOCALES: [&str; 5] = ["EN", "FR", "SV", "DE", "ES"];

/// Supported tags. Matching is case-sensitive.
pub const TAGS: [&str; 3] = ["WEB", "MOBILE", "DESKTOP"];

/// Default page size for search.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// A translation entry as stored in the index and returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationDocument {
    pub id: String,
    pub key: String,
    pub value: String,
    pub locale: String,
    pub tag: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl TranslationDocument {
    /// New document with a fresh UUID and both timestamps set to now.
    pub fn from_create_request(request: TranslationCreateRequest) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            key: request.key,
            value: request.value,
            locale: request.locale,
            tag: request.tag,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite all editable fields and bump `updated_at`.
    pub fn apply_update(&mut self, request: TranslationUpdateRequest) {
        self.key = request.key;
        self.value = request.value;
        self.locale = request.locale;
        self.tag = request.tag;
        self.updated_at = Utc::now().timestamp_millis();
    }
}

/// Accepts blank values; emptiness is reported by the length check.
pub fn validate_locale(locale: &str) -> Result<(), ValidationError> {
    if locale.trim().is_empty() || LOCALES.contains(&locale) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_locale"))
    }
}

/// Accepts blank values; emptiness is reported by the length check.
pub fn validate_tag(tag: &str) -> Result<(), ValidationError> {
    if tag.trim().is_empty() || TAGS.contains(&tag) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_tag"))
    }
}

/// Explicit `null` reads as an empty string so it fails the length check
/// like a missing field does.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Body of `POST /v1/translation` (and each item of the bulk endpoint).
///
/// Missing or null fields deserialize as empty strings and fail validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TranslationCreateRequest {
    #[validate(length(min = 1, message = "key can't be null or empty"))]
    #[serde(deserialize_with = "null_as_empty")]
    pub key: String,

    #[validate(length(min = 1, message = "value can't be null or empty"))]
    #[serde(deserialize_with = "null_as_empty")]
    pub value: String,

    #[validate(
        length(min = 1, message = "locale can't be null or empty"),
        custom(function = "crate::models::validate_locale", message = "Invalid locale")
    )]
    #[serde(deserialize_with = "null_as_empty")]
    pub locale: String,

    #[validate(
        length(min = 1, message = "tag can't be null or empty"),
        custom(function = "crate::models::validate_tag", message = "Invalid tag")
    )]
    #[serde(deserialize_with = "null_as_empty")]
    pub tag: String,
}

/// Body of `PUT /v1/translation/:translation_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TranslationUpdateRequest {
    #[validate(length(min = 1, message = "Key cannot be null or empty"))]
    #[serde(deserialize_with = "null_as_empty")]
    pub key: String,

    #[validate(length(min = 1, message = "Value cannot be null or empty"))]
    #[serde(deserialize_with = "null_as_empty")]
    pub value: String,

    #[validate(
        length(min = 1, message = "Locale cannot be null or empty"),
        custom(
            function = "crate::models::validate_locale",
            message = "Invalid locale specified"
        )
    )]
    #[serde(deserialize_with = "null_as_empty")]
    pub locale: String,

    #[validate(
        length(min = 1, message = "Tag cannot be null or empty"),
        custom(
            function = "crate::models::validate_tag",
            message = "Invalid tag specified"
        )
    )]
    #[serde(deserialize_with = "null_as_empty")]
    pub tag: String,
}

/// Query string of `GET /v1/translation/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub key: Option<String>,
    pub tag: Option<String>,
    pub locale: Option<String>,
    pub value: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl SearchParams {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria::new(
            self.key.as_deref(),
            self.tag.as_deref(),
            self.locale.as_deref(),
            self.value.as_deref(),
        )
    }
}

/// Search filters with blank values removed.
///
/// `key`, `tag` and `locale` are exact matches; `value` is a full-text match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub key: Option<String>,
    pub tag: Option<String>,
    pub locale: Option<String>,
    pub value: Option<String>,
}

impl SearchCriteria {
    pub fn new(
        key: Option<&str>,
        tag: Option<&str>,
        locale: Option<&str>,
        value: Option<&str>,
    ) -> Self {
        fn non_blank(v: Option<&str>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty()).map(str::to_string)
        }

        Self {
            key: non_blank(key),
            tag: non_blank(tag),
            locale: non_blank(locale),
            value: non_blank(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.tag.is_none() && self.locale.is_none() && self.value.is_none()
    }
}

/// Liveness response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn create_request(key: &str, value: &str, locale: &str, tag: &str) -> TranslationCreateRequest {
        TranslationCreateRequest {
            key: key.to_string(),
            value: value.to_string(),
            locale: locale.to_string(),
            tag: tag.to_string(),
        }
    }

    fn messages(errors: &validator::ValidationErrors, field: &str) -> Vec<String> {
        errors
            .field_errors()
            .get(field)
            .map(|errs| {
                errs.iter()
                    .filter_map(|e| e.message.as_ref().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_valid_create_request() {
        assert!(create_request("greeting", "Hello", "EN", "WEB").validate().is_ok());
    }

    #[test]
    fn test_empty_fields_report_emptiness_only() {
        let errors = TranslationCreateRequest::default().validate().unwrap_err();

        assert_eq!(messages(&errors, "key"), vec!["key can't be null or empty"]);
        assert_eq!(messages(&errors, "value"), vec!["value can't be null or empty"]);
        assert_eq!(messages(&errors, "locale"), vec!["locale can't be null or empty"]);
        assert_eq!(messages(&errors, "tag"), vec!["tag can't be null or empty"]);
    }

    #[test]
    fn test_unknown_locale_and_tag() {
        let errors = create_request("greeting", "Hello", "XX", "TV")
            .validate()
            .unwrap_err();

        assert_eq!(messages(&errors, "locale"), vec!["Invalid locale"]);
        assert_eq!(messages(&errors, "tag"), vec!["Invalid tag"]);
    }

    #[test]
    fn test_locale_is_case_sensitive() {
        assert!(create_request("greeting", "Hello", "en", "WEB").validate().is_err());
        assert!(create_request("greeting", "Hello", "EN", "web").validate().is_err());
    }

    #[test]
    fn test_update_request_messages() {
        let request = TranslationUpdateRequest {
            key: String::new(),
            value: "Hej".to_string(),
            locale: "XX".to_string(),
            tag: "MOBILE".to_string(),
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(messages(&errors, "key"), vec!["Key cannot be null or empty"]);
        assert_eq!(messages(&errors, "locale"), vec!["Invalid locale specified"]);
        assert!(messages(&errors, "tag").is_empty());
    }

    #[test]
    fn test_create_request_missing_fields_deserialize_empty() {
        let request: TranslationCreateRequest = serde_json::from_str(r#"{"key":"k"}"#).unwrap();
        assert_eq!(request.key, "k");
        assert!(request.value.is_empty());
    }

    #[test]
    fn test_null_fields_deserialize_empty() {
        let request: TranslationUpdateRequest =
            serde_json::from_str(r#"{"key":null,"value":"v","locale":null,"tag":"WEB"}"#).unwrap();
        assert!(request.key.is_empty());
        assert!(request.locale.is_empty());

        let errors = request.validate().unwrap_err();
        assert_eq!(messages(&errors, "key"), vec!["Key cannot be null or empty"]);
        assert_eq!(messages(&errors, "locale"), vec!["Locale cannot be null or empty"]);
    }

    #[test]
    fn test_document_from_create_request() {
        let doc = TranslationDocument::from_create_request(create_request("k", "v", "FR", "MOBILE"));

        assert!(Uuid::parse_str(&doc.id).is_ok());
        assert_eq!(doc.key, "k");
        assert_eq!(doc.locale, "FR");
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn test_document_apply_update_keeps_id_and_created_at() {
        let mut doc = TranslationDocument::from_create_request(create_request("k", "v", "FR", "MOBILE"));
        let id = doc.id.clone();
        let created_at = doc.created_at;

        doc.apply_update(TranslationUpdateRequest {
            key: "k2".to_string(),
            value: "v2".to_string(),
            locale: "SV".to_string(),
            tag: "DESKTOP".to_string(),
        });

        assert_eq!(doc.id, id);
        assert_eq!(doc.created_at, created_at);
        assert!(doc.updated_at >= created_at);
        assert_eq!(doc.key, "k2");
        assert_eq!(doc.tag, "DESKTOP");
    }

    #[test]
    fn test_document_json_is_camel_case() {
        let doc = TranslationDocument {
            id: "1".to_string(),
            key: "k".to_string(),
            value: "v".to_string(),
            locale: "EN".to_string(),
            tag: "WEB".to_string(),
            created_at: 10,
            updated_at: 20,
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["createdAt"], 10);
        assert_eq!(json["updatedAt"], 20);
    }

    #[test]
    fn test_search_criteria_drops_blank_filters() {
        let criteria = SearchCriteria::new(Some("  "), Some("WEB"), None, Some(""));

        assert_eq!(criteria.key, None);
        assert_eq!(criteria.tag.as_deref(), Some("WEB"));
        assert_eq!(criteria.value, None);
        assert!(!criteria.is_empty());
        assert!(SearchCriteria::default().is_empty());
    }

    #[test]
    fn test_search_params_defaults() {
        let params: SearchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 0);
        assert_eq!(params.size, DEFAULT_PAGE_SIZE);
    }
}
