//! # truestate-db: Database Layer for TruEstate
//!
//! This crate provides read-only PostgreSQL access for the TruEstate API.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TruEstate Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (GET /api/transactions)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   truestate-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │   Recovery   │  │   │
//! │  │   │   (pool.rs)   │    │ (transaction) │    │ (recovery.rs)│  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ PgPool        │◄───│ Transaction-  │───►│ 25P02 retry  │  │   │
//! │  │   │ startup retry │    │ Repository    │    │ 57014 drop   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                              ▲                                  │   │
//! │  │                              │ implements                       │   │
//! │  │                        TransactionStore (store.rs)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           PostgreSQL: `transactions` (externally populated)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, session settings, startup retry
//! - [`recovery`] - Reconnect/retry policy for broken sessions
//! - [`store`] - The `TransactionStore` trait handlers depend on
//! - [`error`] - Database error types
//! - [`repository`] - PostgreSQL implementation of the store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use truestate_db::{Database, DbConfig, TransactionStore};
//!
//! let db = Database::connect(DbConfig::new(url)).await?;
//! let stats = db.transactions().sales_stats().await?;
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pool;
pub mod recovery;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use recovery::{fetch_with_recovery, Connector, Recovery};
pub use store::TransactionStore;

pub use repository::transaction::TransactionRepository;
