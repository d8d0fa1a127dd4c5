//! # Error Types
//!
//! Domain-specific error types for cotiza-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ValidationError  - a user-facing problem with one field               │
//! │                     (returned as data, never short-circuits pricing)    │
//! │                                                                         │
//! │  EngineError      - malformed payloads and the save/export gate        │
//! │                     (returned through Result)                          │
//! │                                                                         │
//! │  Non-numeric input and unknown billing/discount modes are NOT errors:  │
//! │  they coerce to 0 so a live preview can always render.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced through `Result` by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The draft payload does not have the expected shape.
    ///
    /// ## When This Occurs
    /// - A field has the wrong JSON type where no coercion applies
    ///   (e.g. `lineItems` is an object, `operationMode` is "hydraulic")
    /// - The editor and engine disagree on the schema version
    #[error("Malformed quote payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A computed result could not be serialized.
    #[error("Failed to serialize quote result: {0}")]
    Serialization(String),

    /// Save or export was attempted while validation messages remain.
    ///
    /// ## User Workflow
    /// ```text
    /// Click "Save quote"
    ///      │
    ///      ▼
    /// QuoteResult::ensure_valid()
    ///      │
    ///      ├── errors empty → hand payload to persistence
    ///      │
    ///      └── InvalidQuote { errors } → UI lists every message at once
    /// ```
    #[error("Quote has {} validation error(s)", errors.len())]
    InvalidQuote { errors: Vec<String> },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A problem with one field of a measurement, line item or quote.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be greater than zero.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Declared quantity differs from the number of captured openings.
    #[error("quantity is {declared} but {captured} measurement(s) were captured")]
    QuantityMismatch { declared: u32, captured: usize },

    /// A quote cannot be saved without line items.
    #[error("quote must contain at least one line item")]
    NoLineItems,
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("control side").to_string(),
            "control side is required"
        );
        assert_eq!(
            ValidationError::must_be_positive("width").to_string(),
            "width must be greater than zero"
        );
        assert_eq!(
            ValidationError::QuantityMismatch {
                declared: 3,
                captured: 2
            }
            .to_string(),
            "quantity is 3 but 2 measurement(s) were captured"
        );
    }

    #[test]
    fn test_invalid_quote_message_counts_errors() {
        let err = EngineError::InvalidQuote {
            errors: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Quote has 2 validation error(s)");
    }

    #[test]
    fn test_validation_converts_to_engine_error() {
        let engine_err: EngineError = ValidationError::NoLineItems.into();
        assert!(matches!(engine_err, EngineError::Validation(_)));
    }

    #[test]
    fn test_json_error_converts_to_malformed_payload() {
        let json_err = serde_json::from_str::<u32>("{").unwrap_err();
        let engine_err: EngineError = json_err.into();
        assert!(matches!(engine_err, EngineError::MalformedPayload(_)));
    }
}
