//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for the service's error body.

use serde_json::Value;

/// Service code carried in every error body.
const SERVICE_CODE: u64 = 1000;

/// Custom assertions for error responses
///
/// # Example
/// ```rust,ignore
/// body.assert_error_message("NOT_FOUND")
///     .assert_error_count(1)
///     .assert_reason(0, "NOT_FOUND");
/// ```
pub trait ErrorBodyAssertions {
    /// Assert the service code and top-level message
    fn assert_error_message(&self, message: &str) -> &Self;

    /// Assert the number of detail entries
    fn assert_error_count(&self, count: usize) -> &Self;

    /// Assert the reason of the detail entry at `index`
    fn assert_reason(&self, index: usize, reason: &str) -> &Self;

    /// Assert the domain of the detail entry at `index`
    fn assert_domain(&self, index: usize, domain: &str) -> &Self;
}

impl ErrorBodyAssertions for Value {
    fn assert_error_message(&self, message: &str) -> &Self {
        assert_eq!(
            self["code"].as_u64(),
            Some(SERVICE_CODE),
            "Expected service code {SERVICE_CODE} in {self}"
        );
        assert_eq!(self["message"], message, "Unexpected message in {self}");
        self
    }

    fn assert_error_count(&self, count: usize) -> &Self {
        let errors = self["errors"]
            .as_array()
            .unwrap_or_else(|| panic!("Expected errors array in {self}"));
        assert_eq!(errors.len(), count, "Unexpected error count in {self}");
        self
    }

    fn assert_reason(&self, index: usize, reason: &str) -> &Self {
        assert_eq!(
            self["errors"][index]["reason"], reason,
            "Unexpected reason at {index} in {self}"
        );
        self
    }

    fn assert_domain(&self, index: usize, domain: &str) -> &Self {
        assert_eq!(
            self["errors"][index]["domain"], domain,
            "Unexpected domain at {index} in {self}"
        );
        self
    }
}
