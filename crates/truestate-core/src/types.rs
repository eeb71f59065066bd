//! # Domain Types
//!
//! Record and response types served by the TruEstate API.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Transaction    │   │ TransactionPage │   │ FilterOptions   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (internal)  │   │  total          │   │  distinct lists │       │
//! │  │  transaction_id │   │  page/page_size │   │  age_range      │       │
//! │  │  customer/...   │   │  total_pages    │   │  date_range     │       │
//! │  │  date           │   │  data[]         │   │  total_records  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   SalesStats    │   │  HealthStatus   │                             │
//! │  │  counts, sums,  │   │  status/service │                             │
//! │  │  min/max/avg    │   │  version        │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! Every transaction has:
//! - `id`: internal numeric key, never used for lookups by clients
//! - `transaction_id`: the external business key used by `/api/transactions/{id}`
//!
//! Dates are `chrono::NaiveDate` and serialize as ISO-8601 `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Transaction
// =============================================================================

/// One retail sale, as stored in the `transactions` table.
///
/// The table is owned by an external ingestion process; everything except the
/// two keys may be NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    /// Internal numeric key.
    #[ts(type = "number")]
    pub id: i64,

    /// External lookup key (unique).
    pub transaction_id: String,

    /// Sale date.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,

    // -- Customer --
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub customer_region: Option<String>,
    pub customer_type: Option<String>,

    // -- Product --
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub product_category: Option<String>,
    pub tags: Option<Vec<String>>,

    // -- Sale --
    pub quantity: Option<i32>,
    pub price_per_unit: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub total_amount: Option<f64>,
    pub final_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub order_status: Option<String>,
    pub delivery_type: Option<String>,

    // -- Store --
    pub store_id: Option<String>,
    pub store_location: Option<String>,
    pub salesperson_id: Option<String>,
    pub employee_name: Option<String>,
}

impl Transaction {
    /// Creates a transaction with only its keys set, for test fixtures.
    ///
    /// Real rows come from the database. Outside this crate's own tests,
    /// enable the `test-fixtures` feature.
    #[cfg(any(test, feature = "test-fixtures"))]
    pub fn new(id: i64, transaction_id: impl Into<String>) -> Self {
        Transaction {
            id,
            transaction_id: transaction_id.into(),
            date: None,
            customer_id: None,
            customer_name: None,
            phone_number: None,
            gender: None,
            age: None,
            customer_region: None,
            customer_type: None,
            product_id: None,
            product_name: None,
            brand: None,
            product_category: None,
            tags: None,
            quantity: None,
            price_per_unit: None,
            discount_percentage: None,
            total_amount: None,
            final_amount: None,
            payment_method: None,
            order_status: None,
            delivery_type: None,
            store_id: None,
            store_location: None,
            salesperson_id: None,
            employee_name: None,
        }
    }
}

// =============================================================================
// Paginated Response
// =============================================================================

/// One page of filtered transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionPage {
    /// Rows matching the filter (ignores pagination).
    #[ts(type = "number")]
    pub total: i64,

    /// 1-based page number that was requested.
    pub page: u32,

    /// Requested page size.
    pub page_size: u32,

    /// `ceil(total / page_size)`, zero when nothing matches.
    #[ts(type = "number")]
    pub total_pages: i64,

    /// Rows on this page.
    pub data: Vec<Transaction>,
}

impl TransactionPage {
    /// Builds a page, deriving `total_pages` from `total` and `page_size`.
    pub fn new(total: i64, page: u32, page_size: u32, data: Vec<Transaction>) -> Self {
        TransactionPage {
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
            data,
        }
    }
}

/// Number of pages needed to show `total` rows, `page_size` at a time.
///
/// ## Example
/// ```rust
/// use truestate_core::types::total_pages;
///
/// assert_eq!(total_pages(15, 10), 2);
/// assert_eq!(total_pages(20, 10), 2);
/// assert_eq!(total_pages(0, 10), 0);
/// ```
pub fn total_pages(total: i64, page_size: u32) -> i64 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    let size = i64::from(page_size);
    (total + size - 1) / size
}

// =============================================================================
// Filter Options
// =============================================================================

/// Inclusive age bounds present in the table (`null` on an empty table).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgeRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

/// Inclusive date bounds present in the table (`null` on an empty table).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    pub min: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub max: Option<NaiveDate>,
}

/// Distinct values for every filter dropdown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FilterOptions {
    #[ts(type = "number")]
    pub total_records: i64,
    pub regions: Vec<String>,
    pub genders: Vec<String>,
    pub categories: Vec<String>,
    pub payment_methods: Vec<String>,
    pub order_statuses: Vec<String>,
    pub tags: Vec<String>,
    pub age_range: AgeRange,
    pub date_range: DateRange,
}

/// Drops blank entries from a distinct-value list.
///
/// `ARRAY_AGG` over an empty table yields NULL, and the source data has
/// empty strings; neither is a useful dropdown option.
pub fn non_empty_values(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .collect()
}

// =============================================================================
// Aggregate Stats
// =============================================================================

/// Whole-table aggregates for the analytics header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesStats {
    #[ts(type = "number")]
    pub total_transactions: i64,
    #[ts(type = "number")]
    pub unique_customers: i64,
    #[ts(type = "number")]
    pub unique_products: i64,
    /// Average final amount, rounded to 2 decimals.
    pub avg_amount: Option<f64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    #[ts(type = "number | null")]
    pub total_quantity_sold: Option<i64>,
    pub total_revenue: Option<f64>,
}

// =============================================================================
// Health
// =============================================================================

/// Health check payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthStatus {
    /// `healthy` or `degraded`.
    pub status: String,
    pub service: String,
    pub version: String,
    /// `connected` or `unreachable`.
    pub database: String,
}

impl HealthStatus {
    /// Builds the payload from the database probe result.
    pub fn from_probe(database_ok: bool, version: impl Into<String>) -> Self {
        let (status, database) = if database_ok {
            ("healthy", "connected")
        } else {
            ("degraded", "unreachable")
        };
        HealthStatus {
            status: status.to_string(),
            service: crate::SERVICE_NAME.to_string(),
            version: version.into(),
            database: database.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
