//! # Error Types
//!
//! Domain-specific error types for truestate-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  truestate-core errors (this file)                                     │
//! │  └── ValidationError  - Query-string validation failures               │
//! │                                                                         │
//! │  truestate-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (in apps/api)                                             │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError ──┐                                             │
//! │        DbError ──────────┴──► ApiError → JSON body + status code       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lenient inputs (unknown sort field, sort direction, tag mode) never
//! produce an error here: they are normalized to defaults in [`crate::filter`].

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a query-string value cannot be used at all.
/// They map to HTTP 400 in the API layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be at least a given minimum.
    #[error("{field} must be at least {min}")]
    TooSmall { field: String, min: i64 },

    /// Invalid format (e.g., a date that is not YYYY-MM-DD).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The query string itself could not be parsed.
    #[error("Invalid query parameters: {0}")]
    Malformed(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max: 100,
        };
        assert_eq!(err.to_string(), "page_size must be between 1 and 100");

        let err = ValidationError::InvalidFormat {
            field: "date_from".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "date_from has invalid format: expected YYYY-MM-DD"
        );
    }
}
