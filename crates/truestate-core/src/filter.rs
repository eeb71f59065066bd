//! # Filter Criteria
//!
//! The per-request description of which transactions to return, and how the
//! raw query string becomes one.
//!
//! ## Normalization Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Query String → FilterCriteria                        │
//! │                                                                         │
//! │  ?regions=East, West,&sort=bogus&sort_order=up&tags=a,b,c,d&page=2     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TransactionQuery (raw strings, serde)                                 │
//! │       │                                                                 │
//! │       │  into_criteria()                                                │
//! │       │   • lists: split on ',', trim, drop empties                    │
//! │       │   • tags: same, then keep the first 3                          │
//! │       │   • sort / sort_order / tags_mode: lenient, default on junk    │
//! │       │   • page / page_size / dates: strict, ValidationError on junk  │
//! │       ▼                                                                 │
//! │  FilterCriteria { regions: [East, West], sort: Date,                   │
//! │                   order: Descending, tags: [a, b, c], page: 2 }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ValidationResult;
use crate::validation::{parse_date, validate_page, validate_page_size};
use crate::{DEFAULT_PAGE_SIZE, MAX_TAG_FILTERS};

// =============================================================================
// Sort Field
// =============================================================================

/// Columns a client may sort by.
///
/// Anything outside this allow-list sorts by [`SortField::Date`]; the
/// enum is the only way a column name reaches ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Date,
    CustomerName,
    FinalAmount,
    Age,
    CustomerRegion,
    ProductCategory,
    OrderStatus,
}

impl SortField {
    /// Parses a `sort` parameter, falling back to `Date` for unknown values.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "date" => SortField::Date,
            "customer_name" => SortField::CustomerName,
            "final_amount" => SortField::FinalAmount,
            "age" => SortField::Age,
            "customer_region" => SortField::CustomerRegion,
            "product_category" => SortField::ProductCategory,
            "order_status" => SortField::OrderStatus,
            _ => SortField::Date,
        }
    }

    /// Column name written into ORDER BY.
    pub const fn column(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::CustomerName => "customer_name",
            SortField::FinalAmount => "final_amount",
            SortField::Age => "age",
            SortField::CustomerRegion => "customer_region",
            SortField::ProductCategory => "product_category",
            SortField::OrderStatus => "order_status",
        }
    }
}

// =============================================================================
// Sort Order
// =============================================================================

/// Sort direction. Unknown input means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Parses a `sort_order` parameter (`ASC`, `desc`, `ascending`, ...).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortOrder::Ascending,
            _ => SortOrder::Descending,
        }
    }

    /// SQL keyword.
    pub const fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

// =============================================================================
// Tag Mode
// =============================================================================

/// How multiple tag filters combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMode {
    /// A row matches if it carries any of the tags.
    #[default]
    Any,
    /// A row matches only if it carries every tag.
    All,
}

impl TagMode {
    /// Parses a `tags_mode` parameter. Unknown values mean `Any`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => TagMode::All,
            _ => TagMode::Any,
        }
    }
}

// =============================================================================
// Filter Criteria
// =============================================================================

/// Normalized filter, sort and pagination settings for one list request.
///
/// Empty vectors and `None` mean "no predicate".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the customer name.
    pub search: Option<String>,
    pub regions: Vec<String>,
    pub genders: Vec<String>,
    pub categories: Vec<String>,
    pub payment_methods: Vec<String>,
    pub order_statuses: Vec<String>,
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// At most [`MAX_TAG_FILTERS`] tags.
    pub tags: Vec<String>,
    pub tag_mode: TagMode,
    pub sort: SortField,
    pub order: SortOrder,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            search: None,
            regions: Vec::new(),
            genders: Vec::new(),
            categories: Vec::new(),
            payment_methods: Vec::new(),
            order_statuses: Vec::new(),
            age_min: None,
            age_max: None,
            date_from: None,
            date_to: None,
            tags: Vec::new(),
            tag_mode: TagMode::Any,
            sort: SortField::Date,
            order: SortOrder::Descending,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterCriteria {
    /// Rows to skip before the requested page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    /// Sets the tag list, keeping only the first [`MAX_TAG_FILTERS`] entries.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags.into_iter().take(MAX_TAG_FILTERS).collect();
        self
    }
}

// =============================================================================
// Raw Query Parameters
// =============================================================================

/// `/api/transactions` query string exactly as the client sent it.
///
/// Numeric fields are typed so the HTTP layer rejects non-integers; every
/// other field stays a string until [`TransactionQuery::into_criteria`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    pub q: Option<String>,
    pub regions: Option<String>,
    pub genders: Option<String>,
    pub categories: Option<String>,
    pub payment_methods: Option<String>,
    pub order_statuses: Option<String>,
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub tags: Option<String>,
    pub tags_mode: Option<String>,
    pub sort: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl TransactionQuery {
    /// Normalizes the raw parameters.
    ///
    /// ## Errors
    /// - `page` < 1 or `page_size` outside [1, 100]
    /// - `date_from` / `date_to` not in `YYYY-MM-DD` form
    pub fn into_criteria(self) -> ValidationResult<FilterCriteria> {
        let page = validate_page(self.page.unwrap_or(1))?;
        let page_size = validate_page_size(self.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)))?;

        let date_from = match self.date_from.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_date("date_from", raw)?),
            _ => None,
        };
        let date_to = match self.date_to.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_date("date_to", raw)?),
            _ => None,
        };

        let search = self
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        let criteria = FilterCriteria {
            search,
            regions: split_list(self.regions.as_deref()),
            genders: split_list(self.genders.as_deref()),
            categories: split_list(self.categories.as_deref()),
            payment_methods: split_list(self.payment_methods.as_deref()),
            order_statuses: split_list(self.order_statuses.as_deref()),
            age_min: self.age_min,
            age_max: self.age_max,
            date_from,
            date_to,
            tags: Vec::new(),
            tag_mode: self.tags_mode.as_deref().map(TagMode::parse).unwrap_or_default(),
            sort: self.sort.as_deref().map(SortField::parse).unwrap_or_default(),
            order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            page,
            page_size,
        };

        Ok(criteria.with_tags(split_list(self.tags.as_deref())))
    }
}

/// Splits a comma-separated parameter into trimmed, non-empty values.
///
/// ## Example
/// ```rust
/// use truestate_core::filter::split_list;
///
/// assert_eq!(split_list(Some(" East, West ,,")), vec!["East", "West"]);
/// assert!(split_list(Some("")).is_empty());
/// assert!(split_list(None).is_empty());
/// ```
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

// =============================================================================
// Unit Tests
// =============================================================================
