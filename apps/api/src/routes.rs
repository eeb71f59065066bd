//! HTTP handlers.
//!
//! Every handler is a thin shell: extract, normalize, call the store, wrap in
//! JSON. SQL lives in `truestate-core::query`; execution in `truestate-db`.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::debug;

use truestate_core::filter::TransactionQuery;
use truestate_core::{FilterOptions, HealthStatus, SalesStats, Transaction, TransactionPage};

use crate::error::ApiError;
use crate::AppState;

type Shared = State<Arc<AppState>>;

/// `GET /api/health`
///
/// Always 200; a failed database probe reports `status: "degraded"`.
pub async fn health(State(state): Shared) -> Json<HealthStatus> {
    let database_ok = state.store.ping().await;
    Json(HealthStatus::from_probe(
        database_ok,
        env!("CARGO_PKG_VERSION"),
    ))
}

/// `GET /api/transactions`
pub async fn list_transactions(
    State(state): Shared,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<TransactionPage>, ApiError> {
    let Query(raw) = query?;
    let criteria = raw.into_criteria()?;

    let page = state.store.list_transactions(&criteria).await?;
    debug!(
        total = page.total,
        page = page.page,
        returned = page.data.len(),
        "Listed transactions"
    );
    Ok(Json(page))
}

/// `GET /api/transactions/{transaction_id}`
pub async fn get_transaction(
    State(state): Shared,
    Path(transaction_id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    state
        .store
        .find_by_transaction_id(&transaction_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Transaction"))
}

/// `GET /api/filters`
pub async fn filter_options(State(state): Shared) -> Result<Json<FilterOptions>, ApiError> {
    Ok(Json(state.store.filter_options().await?))
}

/// `GET /api/stats`
pub async fn sales_stats(State(state): Shared) -> Result<Json<SalesStats>, ApiError> {
    Ok(Json(state.store.sales_stats().await?))
}

/// Unknown paths get the same JSON error shape as everything else.
pub async fn fallback() -> ApiError {
    ApiError::not_found("Route")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Mutex;
    use tower::ServiceExt;

    use truestate_core::{AgeRange, SqlQuery, SqlValue};
    use truestate_db::{DbError, DbResult, TransactionStore};

    use crate::{build_router, ApiConfig};

    /// In-memory store that pages over a fixed row set and remembers the
    /// statements it was asked to run.
    #[derive(Default)]
    struct MemoryStore {
        rows: Vec<Transaction>,
        healthy: bool,
        broken: bool,
        seen: Mutex<Vec<SqlQuery>>,
    }

    impl MemoryStore {
        fn with_rows(n: i64) -> Self {
            MemoryStore {
                rows: (1..=n)
                    .map(|i| Transaction::new(i, format!("TXN-{i:04}")))
                    .collect(),
                healthy: true,
                ..Default::default()
            }
        }

        fn broken() -> Self {
            MemoryStore {
                broken: true,
                ..Default::default()
            }
        }

        fn fail_if_broken(&self) -> DbResult<()> {
            if self.broken {
                return Err(DbError::QueryFailed(
                    "relation \"transactions\" does not exist".to_string(),
                ));
            }
            Ok(())
        }

        fn last_query(&self) -> SqlQuery {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    fn int_param(value: &SqlValue) -> i64 {
        match value {
            SqlValue::Int(v) => *v,
            other => panic!("expected integer parameter, got {other:?}"),
        }
    }

    #[async_trait]
    impl TransactionStore for MemoryStore {
        async fn count_matching(&self, query: &SqlQuery) -> DbResult<i64> {
            self.fail_if_broken()?;
            self.seen.lock().unwrap().push(query.clone());
            Ok(self.rows.len() as i64)
        }

        async fn fetch_page(&self, query: &SqlQuery) -> DbResult<Vec<Transaction>> {
            self.fail_if_broken()?;
            self.seen.lock().unwrap().push(query.clone());
            let n = query.params.len();
            let limit = int_param(&query.params[n - 2]) as usize;
            let offset = int_param(&query.params[n - 1]) as usize;
            Ok(self.rows.iter().skip(offset).take(limit).cloned().collect())
        }

        async fn find_by_transaction_id(&self, transaction_id: &str) -> DbResult<Option<Transaction>> {
            self.fail_if_broken()?;
            Ok(self
                .rows
                .iter()
                .find(|t| t.transaction_id == transaction_id)
                .cloned())
        }

        async fn filter_options(&self) -> DbResult<FilterOptions> {
            self.fail_if_broken()?;
            if self.rows.is_empty() {
                return Ok(FilterOptions::default());
            }
            Ok(FilterOptions {
                total_records: self.rows.len() as i64,
                regions: vec!["East".to_string(), "West".to_string()],
                age_range: AgeRange {
                    min: Some(18),
                    max: Some(64),
                },
                ..Default::default()
            })
        }

        async fn sales_stats(&self) -> DbResult<SalesStats> {
            self.fail_if_broken()?;
            Ok(SalesStats {
                total_transactions: self.rows.len() as i64,
                unique_customers: 3,
                unique_products: 2,
                avg_amount: Some(120.5),
                min_amount: Some(10.0),
                max_amount: Some(300.0),
                total_quantity_sold: Some(42),
                total_revenue: Some(1807.5),
            })
        }

        async fn ping(&self) -> bool {
            self.healthy
        }
    }

    async fn get(store: Arc<MemoryStore>, uri: &str) -> (StatusCode, serde_json::Value) {
        let state = Arc::new(AppState::new(store, ApiConfig::default()));
        let response = build_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_healthy() {
        let (status, body) = get(Arc::new(MemoryStore::with_rows(1)), "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "TruEstate API");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_health_degraded_is_still_200() {
        let (status, body) = get(Arc::new(MemoryStore::default()), "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "unreachable");
    }

    #[tokio::test]
    async fn test_second_page_of_fifteen() {
        let store = Arc::new(MemoryStore::with_rows(15));
        let (status, body) = get(
            store.clone(),
            "/api/transactions?regions=East&page=2&page_size=10",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 15);
        assert_eq!(body["page"], 2);
        assert_eq!(body["page_size"], 10);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["data"][0]["transaction_id"], "TXN-0011");

        let data_query = store.last_query();
        let n = data_query.params.len();
        assert_eq!(
            &data_query.params[n - 2..],
            &[SqlValue::Int(10), SqlValue::Int(10)]
        );
        assert!(data_query.sql.contains("customer_region IN ($1)"));
    }

    #[tokio::test]
    async fn test_defaults_and_lenient_sort() {
        let store = Arc::new(MemoryStore::with_rows(3));
        let (status, body) = get(
            store.clone(),
            "/api/transactions?sort=password&sort_order=sideways",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_size"], 10);
        assert_eq!(body["total_pages"], 1);
        assert!(store
            .last_query()
            .sql
            .contains("ORDER BY date DESC, id DESC"));
    }

    #[tokio::test]
    async fn test_empty_result_has_zero_pages() {
        let (status, body) = get(Arc::new(MemoryStore::with_rows(0)), "/api/transactions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert_eq!(body["total_pages"], 0);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_invalid_paging_rejected() {
        for uri in [
            "/api/transactions?page=0",
            "/api/transactions?page_size=0",
            "/api/transactions?page_size=101",
            "/api/transactions?page=abc",
            "/api/transactions?age_min=old",
            "/api/transactions?date_from=2023-02-30",
        ] {
            let (status, body) = get(Arc::new(MemoryStore::with_rows(1)), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], "VALIDATION_ERROR", "{uri}");
            assert!(body["detail"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_detail_found() {
        let (status, body) = get(
            Arc::new(MemoryStore::with_rows(5)),
            "/api/transactions/TXN-0003",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 3);
        assert_eq!(body["transaction_id"], "TXN-0003");
    }

    #[tokio::test]
    async fn test_detail_missing_is_404() {
        let (status, body) = get(
            Arc::new(MemoryStore::with_rows(5)),
            "/api/transactions/NOPE-1",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            serde_json::json!({"code": "NOT_FOUND", "detail": "Transaction not found"})
        );
    }

    #[tokio::test]
    async fn test_filters_on_empty_table() {
        let (status, body) = get(Arc::new(MemoryStore::with_rows(0)), "/api/filters").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_records"], 0);
        assert_eq!(body["regions"], serde_json::json!([]));
        assert_eq!(body["tags"], serde_json::json!([]));
        assert!(body["age_range"]["min"].is_null());
        assert!(body["date_range"]["max"].is_null());
    }

    #[tokio::test]
    async fn test_filters_and_stats() {
        let store = Arc::new(MemoryStore::with_rows(4));

        let (_, filters) = get(store.clone(), "/api/filters").await;
        assert_eq!(filters["total_records"], 4);
        assert_eq!(filters["regions"], serde_json::json!(["East", "West"]));

        let (status, stats) = get(store, "/api/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_transactions"], 4);
        assert_eq!(stats["avg_amount"], 120.5);
        assert_eq!(stats["total_quantity_sold"], 42);
    }

    #[tokio::test]
    async fn test_database_failure_is_generic_500() {
        let (status, body) = get(Arc::new(MemoryStore::broken()), "/api/stats").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert!(!body["detail"].as_str().unwrap().contains("relation"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get(Arc::new(MemoryStore::with_rows(1)), "/api/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
