//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL error (sqlx::Error, carries SQLSTATE)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classified by SQLSTATE                        │
//! │       │                                                                 │
//! │       ├──► Recovery::for_error ← reconnect / retry decision            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in apps/api) ← Generic message, raw error only in logs      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// SQLSTATE for "current transaction is aborted, commands ignored until end
/// of transaction block".
pub const SQLSTATE_IN_FAILED_TRANSACTION: &str = "25P02";

/// SQLSTATE for "canceling statement due to statement timeout / user request".
pub const SQLSTATE_QUERY_CANCELED: &str = "57014";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Could not reach or authenticate against PostgreSQL.
    ///
    /// ## When This Occurs
    /// - Server down or unreachable at startup
    /// - Connection dropped mid-statement
    /// - Pool already closed during shutdown
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The session is stuck in a failed transaction block (SQLSTATE 25P02).
    ///
    /// ## When This Occurs
    /// - A previous statement on the same connection failed inside an
    ///   implicit transaction that was never rolled back
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    /// The statement was canceled (SQLSTATE 57014).
    ///
    /// ## When This Occurs
    /// - `statement_timeout` fired
    /// - An operator canceled the backend
    #[error("Query canceled: {0}")]
    QueryCanceled(String),

    /// Any other error reported by the server.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row could not be decoded into the expected Rust type.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Maps a server-reported error to a variant using its SQLSTATE.
    ///
    /// ## Example
    /// ```rust
    /// use truestate_db::DbError;
    ///
    /// let err = DbError::classify(Some("57014"), "canceling statement due to statement timeout");
    /// assert!(matches!(err, DbError::QueryCanceled(_)));
    /// ```
    pub fn classify(sqlstate: Option<&str>, message: &str) -> Self {
        match sqlstate {
            Some(SQLSTATE_IN_FAILED_TRANSACTION) => DbError::TransactionAborted(message.to_string()),
            Some(SQLSTATE_QUERY_CANCELED) => DbError::QueryCanceled(message.to_string()),
            // Class 08: connection exception
            Some(code) if code.starts_with("08") => DbError::ConnectionFailed(message.to_string()),
            _ => DbError::QueryFailed(message.to_string()),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → classify(SQLSTATE)
/// sqlx::Error::ColumnDecode   → DbError::Decode
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io / Tls / ... → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code();
                DbError::classify(code.as_deref(), db_err.message())
            }

            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => DbError::Decode(err.to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Configuration(_) => {
                DbError::ConnectionFailed(err.to_string())
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
