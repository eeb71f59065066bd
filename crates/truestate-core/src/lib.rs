//! # truestate-core: Pure Types and Query Building for TruEstate
//!
//! This crate holds everything about a request that can be decided without
//! touching the database: the record and response types, query-string
//! normalization, and the filter query builder that turns criteria into SQL
//! text plus bound parameters.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TruEstate Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard (React)                            │   │
//! │  │    FilterBar ──► TransactionTable ──► Pagination                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum handlers)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ truestate-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  filter   │  │   query   │  │ validation│  │   │
//! │  │   │Transaction│  │ Criteria  │  │ Predicate │  │  page,    │  │   │
//! │  │   │ Page/Stats│  │ SortField │  │ SqlQuery  │  │  dates    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 truestate-db (Database Layer)                   │   │
//! │  │           PgPool, recovery policy, TransactionStore             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Transaction record and response shapes
//! - [`filter`] - Filter criteria, sort field/direction, tag mode
//! - [`query`] - Typed predicate builder producing bound SQL
//! - [`validation`] - Boundary validation (page, page size, dates)
//! - [`error`] - Validation error types
//!
//! ## Example Usage
//!
//! ```rust
//! use truestate_core::filter::{FilterCriteria, SortField};
//! use truestate_core::query::build_filter_query;
//!
//! let mut criteria = FilterCriteria::default();
//! criteria.regions = vec!["East".to_string(), "West".to_string()];
//! criteria.sort = SortField::parse("not-a-column");
//!
//! let query = build_filter_query(&criteria);
//! assert_eq!(criteria.sort, SortField::Date);
//! assert!(query.count.sql.contains("customer_region IN ($1, $2)"));
//! // The data query carries the same parameters plus LIMIT/OFFSET
//! assert_eq!(query.data.params.len(), query.count.params.len() + 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filter;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use filter::{FilterCriteria, SortField, SortOrder, TagMode};
pub use query::{build_filter_query, FilterQuery, SqlQuery, SqlValue};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "TruEstate API";

/// Page size used when the client does not send one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Maximum number of tags honored by the tag filter. Extra tags are dropped,
/// not rejected.
pub const MAX_TAG_FILTERS: usize = 3;
