//! # Database Pool Management
//!
//! Connection pool creation and configuration for PostgreSQL.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  API startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(url) ← Configure pool settings                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect(config).await ← Retry with exponential backoff      │
//! │       │                            until the retry window closes       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │               PgPool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ Each statement checks out its own connection                   │
//! │       ▼                                                                 │
//! │  Request 1 (count) ──► Conn1                                           │
//! │  Request 1 (page)  ──► Conn3                                           │
//! │  Request 2 (stats) ──► Conn2                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Session Settings
//! Every pooled session starts with:
//! - `default_transaction_read_only = on` (the API never writes)
//! - `statement_timeout` from [`DbConfig::statement_timeout`]
//!
//! Statements run in autocommit mode; no explicit transactions are opened.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::transaction::TransactionRepository;

/// Reported to PostgreSQL as `application_name`.
const APPLICATION_NAME: &str = "truestate-api";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use truestate_db::DbConfig;
///
/// let config = DbConfig::new("postgres://localhost/truestate")
///     .max_connections(20)
///     .statement_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_connections, 20);
/// ```
#[derive(Clone)]
pub struct DbConfig {
    /// PostgreSQL connection URL. May contain credentials; never logged.
    pub database_url: String,

    /// Maximum number of connections in the pool.
    /// Default: 10
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a pooled connection.
    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Server-side `statement_timeout` for every session.
    /// Default: 30 seconds
    pub statement_timeout: Duration,

    /// Total time to keep retrying the initial connect.
    /// Default: 30 seconds
    pub connect_retry_window: Duration,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("database_url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .field("connect_retry_window", &self.connect_retry_window)
            .finish()
    }
}

impl DbConfig {
    /// Creates a configuration with defaults for the given URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        DbConfig {
            database_url: database_url.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(600),
            statement_timeout: Duration::from_secs(30),
            connect_retry_window: Duration::from_secs(30),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the pool acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-session statement timeout.
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Sets how long startup keeps retrying the first connect.
    pub fn connect_retry_window(mut self, window: Duration) -> Self {
        self.connect_retry_window = window;
        self
    }

    /// Parses the URL and applies session settings.
    fn connect_options(&self) -> DbResult<PgConnectOptions> {
        let options = PgConnectOptions::from_str(&self.database_url)
            .map_err(|e| DbError::ConnectionFailed(format!("Invalid database URL: {e}")))?
            .application_name(APPLICATION_NAME)
            .options([
                ("default_transaction_read_only", "on".to_string()),
                (
                    "statement_timeout",
                    self.statement_timeout.as_millis().to_string(),
                ),
            ]);
        Ok(options)
    }

    /// Backoff schedule for the startup connect.
    fn connect_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            multiplier: 2.0,
            max_elapsed_time: Some(self.connect_retry_window),
            ..Default::default()
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Opens the connection pool, retrying until the retry window closes.
    ///
    /// ## What This Does
    /// 1. Validates the URL and builds session options
    /// 2. Opens the pool and proves it with one connection
    /// 3. On failure, waits with exponential backoff and tries again
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError)` - URL invalid, or the server stayed unreachable
    pub async fn connect(config: DbConfig) -> DbResult<Self> {
        info!(
            max_connections = config.max_connections,
            statement_timeout_ms = config.statement_timeout.as_millis() as u64,
            "Connecting to PostgreSQL"
        );

        let options = config.connect_options()?;
        let mut backoff = config.connect_backoff();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let result = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(config.connect_timeout)
                .idle_timeout(Some(config.idle_timeout))
                .connect_with(options.clone())
                .await;

            match result {
                Ok(pool) => {
                    info!(attempt, "Database pool created");
                    return Ok(Database { pool });
                }
                Err(e) => match backoff.next_backoff() {
                    Some(wait) => {
                        warn!(attempt, error = %e, ?wait, "Database unreachable, retrying");
                        tokio::time::sleep(wait).await;
                    }
                    None => {
                        error!(attempt, error = %e, "Giving up on database connection");
                        return Err(DbError::ConnectionFailed(e.to_string()));
                    }
                },
            }
        }
    }

    /// Returns the transaction repository.
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    /// Closes the pool, waiting for checked-out connections to return.
    ///
    /// ## When To Call
    /// After the HTTP server has drained, on shutdown.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
