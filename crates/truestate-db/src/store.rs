//! # Transaction Store
//!
//! The data-access seam the HTTP handlers depend on.
//!
//! Handlers hold an `Arc<dyn TransactionStore>`. Production wires in
//! [`TransactionRepository`](crate::TransactionRepository); handler tests wire
//! in an in-memory store and inspect the queries they receive.

use async_trait::async_trait;
use tracing::debug;

use truestate_core::{
    build_filter_query, FilterCriteria, FilterOptions, SalesStats, SqlQuery, Transaction,
    TransactionPage,
};

use crate::error::DbResult;

/// Read-only access to the `transactions` table.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Runs a `COUNT(*) AS total` query and returns the count.
    async fn count_matching(&self, query: &SqlQuery) -> DbResult<i64>;

    /// Runs a page query and decodes its rows.
    async fn fetch_page(&self, query: &SqlQuery) -> DbResult<Vec<Transaction>>;

    /// Looks up one transaction by its external id.
    async fn find_by_transaction_id(&self, transaction_id: &str) -> DbResult<Option<Transaction>>;

    /// Distinct values and ranges for the filter dropdowns.
    async fn filter_options(&self) -> DbResult<FilterOptions>;

    /// Whole-table aggregates.
    async fn sales_stats(&self) -> DbResult<SalesStats>;

    /// `true` when the database answers a trivial query.
    async fn ping(&self) -> bool;

    /// Counts and fetches one page for `criteria`.
    ///
    /// Both statements come from the same [`build_filter_query`] call, so
    /// `total` and `data` always describe the same filter.
    async fn list_transactions(&self, criteria: &FilterCriteria) -> DbResult<TransactionPage> {
        let query = build_filter_query(criteria);
        debug!(
            sql = %query.count.sql,
            params = query.count.params.len(),
            "Listing transactions"
        );

        let total = self.count_matching(&query.count).await?;
        let data = self.fetch_page(&query.data).await?;

        Ok(TransactionPage::new(
            total,
            criteria.page,
            criteria.page_size,
            data,
        ))
    }
}
