//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the TruEstate API                      │
//! │                                                                         │
//! │  Handler -> Result<Json<T>, ApiError>                                  │
//! │       │                                                                 │
//! │       ├── Query string rejected ──── QueryRejection ──┐                │
//! │       ├── Validation failed ──────── ValidationError ─┤                │
//! │       ├── Database failed ────────── DbError ─────────┼──► ApiError    │
//! │       └── Row missing ────────────── not_found() ─────┘       │        │
//! │                                                               ▼        │
//! │                                          status + {"code","detail"}    │
//! │                                                                         │
//! │  Database text is logged with tracing::error! and never sent back.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use truestate_core::ValidationError;
use truestate_db::DbError;

/// Error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "detail": "Transaction not found"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    #[serde(rename = "detail")]
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Query-string validation failed (400)
    ValidationError,

    /// Statement failed (500)
    DatabaseError,

    /// Database unreachable or pool exhausted (503)
    ServiceUnavailable,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        // Log the actual error but return a generic message
        tracing::error!(error = %err, "Database request failed");

        match err {
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                ApiError::new(ErrorCode::ServiceUnavailable, "Database unavailable")
            }
            DbError::QueryCanceled(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database query timed out")
            }
            DbError::TransactionAborted(_) | DbError::QueryFailed(_) | DbError::Decode(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(_) => ApiError::new(ErrorCode::Internal, "Internal server error"),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::from(ValidationError::Malformed(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_code_and_detail() {
        let json = serde_json::to_value(ApiError::not_found("Transaction")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "NOT_FOUND", "detail": "Transaction not found"})
        );
    }

    #[test]
    fn test_db_errors_do_not_leak_server_text() {
        let err = ApiError::from(DbError::QueryFailed(
            "relation \"transactions\" does not exist".to_string(),
        ));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("relation"));

        let err = ApiError::from(DbError::PoolExhausted);
        assert_eq!(err.code.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ApiError::from(DbError::QueryCanceled("statement timeout".to_string()));
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = ApiError::from(ValidationError::TooSmall {
            field: "page".to_string(),
            min: 1,
        });
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "page must be at least 1");
    }
}
