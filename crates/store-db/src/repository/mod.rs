//! # Repository Module
//!
//! Repository implementations for both stores.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service                                                               │
//! │       │  db.inventory().get_by_product(7)                              │
//! │       │  docs.orders().find_by_status(OrderStatus::Ready)              │
//! │       ▼                                                                 │
//! │  Repository  ── SQL lives here and nowhere else                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! Relational store ([`crate::Database`]):
//! - [`UserRepository`](user::UserRepository) - User CRUD
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD, creates/deletes inventory
//! - [`InventoryRepository`](inventory::InventoryRepository) - Stock records and adjustments
//!
//! Document store ([`crate::DocumentStore`]):
//! - [`OrderRepository`](order::OrderRepository) - Order documents, queries, statistics
//! - [`SaleRepository`](sale::SaleRepository) - Sale documents, queries, statistics

pub mod inventory;
pub mod order;
pub mod product;
pub mod sale;
pub mod user;

use chrono::{DateTime, Utc};
use store_core::stats::DateWindow;

/// Unix-millisecond bounds for the projection columns of the document store.
pub(crate) fn window_bounds(window: &DateWindow) -> (Option<i64>, Option<i64>) {
    (
        window.start.map(|s| s.timestamp_millis()),
        window.end.map(|e| e.timestamp_millis()),
    )
}

#[inline]
pub(crate) fn millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}
