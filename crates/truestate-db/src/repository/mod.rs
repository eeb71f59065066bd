//! # Repository Module
//!
//! Database repository implementations for TruEstate.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  state.store.list_transactions(&criteria)                      │
//! │       ▼                                                                 │
//! │  dyn TransactionStore                                                  │
//! │  ├── TransactionRepository  (PostgreSQL, this module)                  │
//! │  └── in-memory store        (handler tests)                            │
//! │       │                                                                 │
//! │       │  SQL from truestate-core::query                                 │
//! │       ▼                                                                 │
//! │  PostgreSQL `transactions` table (read-only)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TransactionRepository`](transaction::TransactionRepository) - listing,
//!   lookup, filter options and stats

pub mod transaction;
