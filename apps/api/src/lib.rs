//! # TruEstate API
//!
//! Read-only HTTP/JSON API over the retail sales `transactions` table.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         TruEstate API                                   │
//! │                                                                         │
//! │  Dashboard ──► axum Router ──► routes::* ──► dyn TransactionStore      │
//! │                  │                               │                      │
//! │                  │ CorsLayer                     ▼                      │
//! │                  │ TraceLayer              PgPool (truestate-db)        │
//! │                  ▼                               │                      │
//! │             AppState (Arc)                       ▼                      │
//! │             • store                         PostgreSQL                  │
//! │             • config                                                    │
//! │                                                                         │
//! │  GET /api/health                  service + database status            │
//! │  GET /api/transactions            filter, sort, paginate               │
//! │  GET /api/transactions/{id}       lookup by transaction_id             │
//! │  GET /api/filters                 dropdown values and ranges           │
//! │  GET /api/stats                   whole-table aggregates               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. The only required setting is `DATABASE_URL`.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use truestate_db::TransactionStore;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};

/// Shared application state.
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn TransactionStore>, config: ApiConfig) -> Self {
        AppState { store, config }
    }
}

/// Builds the full router with middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/transactions", get(routes::list_transactions))
        .route(
            "/api/transactions/{transaction_id}",
            get(routes::get_transaction),
        )
        .route("/api/filters", get(routes::filter_options))
        .route("/api/stats", get(routes::sales_stats))
        .fallback(routes::fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: any origin unless an explicit list is configured.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins = config.cors_origin_list();
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(parsed))
}
