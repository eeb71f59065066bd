//! # Connection Recovery
//!
//! Runs a statement on a pooled connection and repairs the connection when
//! PostgreSQL reports that it is no longer usable.
//!
//! ## Recovery Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Statement Failure Handling                           │
//! │                                                                         │
//! │  acquire() ──► fetch(query)                                            │
//! │                   │                                                     │
//! │          ┌────────┼──────────────────────┬────────────────────┐        │
//! │          ▼        ▼                      ▼                    ▼        │
//! │         Ok     25P02 (aborted)      57014 (canceled)       other       │
//! │          │        │                      │                    │        │
//! │          │     ROLLBACK (best effort)  discard session     propagate   │
//! │          │     discard session         re-raise            (session    │
//! │          │     acquire fresh session                        returns    │
//! │          │     fetch(query) ONCE                            to pool)   │
//! │          │        │                                                    │
//! │          ▼        ▼                                                    │
//! │        rows    rows or error                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decision ([`Recovery::for_error`]) is a pure function of the error.
//! The driver ([`fetch_with_recovery`]) is generic over [`Connector`], so the
//! same code runs against PostgreSQL in production and a scripted connector
//! in tests.

use async_trait::async_trait;
use tracing::{debug, warn};

use truestate_core::SqlQuery;

use crate::error::{DbError, DbResult};

// =============================================================================
// Policy
// =============================================================================

/// What to do with a session after a statement failed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Return the error; the session is healthy and goes back to the pool.
    Propagate,
    /// Close the session and return the error.
    Reconnect,
    /// Roll back, close the session, and run the statement once more on a
    /// fresh session.
    ReconnectAndRetry,
}

impl Recovery {
    /// Picks the recovery action for an error.
    pub fn for_error(err: &DbError) -> Self {
        match err {
            DbError::TransactionAborted(_) => Recovery::ReconnectAndRetry,
            DbError::QueryCanceled(_) => Recovery::Reconnect,
            _ => Recovery::Propagate,
        }
    }
}

// =============================================================================
// Connector
// =============================================================================

/// Source of sessions that can run a [`SqlQuery`].
#[async_trait]
pub trait Connector: Send + Sync {
    /// A checked-out connection.
    type Session: Send;
    /// A raw result row.
    type Row: Send;

    /// Checks out a session.
    async fn acquire(&self) -> DbResult<Self::Session>;

    /// Runs one statement and returns all rows.
    async fn fetch(&self, session: &mut Self::Session, query: &SqlQuery) -> DbResult<Vec<Self::Row>>;

    /// Issues `ROLLBACK` on the session.
    async fn rollback(&self, session: &mut Self::Session) -> DbResult<()>;

    /// Closes the session for good instead of returning it to the pool.
    async fn discard(&self, session: Self::Session);
}

/// Runs `query` applying the [`Recovery`] policy.
///
/// A failed-transaction error is retried exactly once; if the retry fails
/// too, that error is returned.
pub async fn fetch_with_recovery<C: Connector>(
    connector: &C,
    query: &SqlQuery,
) -> DbResult<Vec<C::Row>> {
    let mut session = connector.acquire().await?;

    let err = match connector.fetch(&mut session, query).await {
        Ok(rows) => return Ok(rows),
        Err(err) => err,
    };

    match Recovery::for_error(&err) {
        Recovery::Propagate => Err(err),

        Recovery::Reconnect => {
            warn!(error = %err, "Statement canceled, discarding connection");
            connector.discard(session).await;
            Err(err)
        }

        Recovery::ReconnectAndRetry => {
            warn!(error = %err, "Connection in failed transaction, reconnecting");

            if let Err(rollback_err) = connector.rollback(&mut session).await {
                debug!(error = %rollback_err, "Rollback before reconnect failed");
            }
            connector.discard(session).await;

            let mut fresh = connector.acquire().await?;
            match connector.fetch(&mut fresh, query).await {
                Ok(rows) => {
                    debug!("Retry on fresh connection succeeded");
                    Ok(rows)
                }
                Err(retry_err) => {
                    if Recovery::for_error(&retry_err) != Recovery::Propagate {
                        connector.discard(fresh).await;
                    }
                    Err(retry_err)
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
