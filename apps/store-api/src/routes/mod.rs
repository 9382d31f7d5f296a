//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /health                                                                │
//! │  /api/users      ──► UserService                                        │
//! │  /api/products   ──► ProductService                                     │
//! │  /api/inventory  ──► InventoryService                                   │
//! │  /api/orders     ──► OrderService ─┐                                    │
//! │  /api/sales      ──► SaleService  ─┴─► StockKeeper (shared guard)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every response uses the `{status, message, data?}` envelope, errors
//! included. Unknown routes answer 404 in the same shape.

pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod sales;
pub mod users;

use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, ErrorCode};
use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(users::routes())
        .merge(products::routes())
        .merge(inventory::routes())
        .merge(orders::routes())
        .merge(sales::routes())
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::new(ErrorCode::NotFound, "Route not found")
}

/// `?start=&end=` query of the period and statistics endpoints (RFC 3339).
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}
