//! # store-core: Pure Business Logic for the Store Manager
//!
//! This crate holds the rules that decide what an order or a sale may do:
//! the status machines, the money math and the stock availability checks.
//! Nothing in here touches a database or a socket.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Manager Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    store-api (axum)                             │   │
//! │  │    routes ──► services (order/sale lifecycle, CRUD)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ store-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ lifecycle │  │  pricing  │  │   stock   │  │   │
//! │  │   │  Order    │  │ OrderFlow │  │  totals   │  │ demand    │  │   │
//! │  │   │  Sale     │  │ SaleFlow  │  │  ETA      │  │ checks    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    store-db (Database Layer)                    │   │
//! │  │        relational store + document store, migrations            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Inventory, Order, Sale)
//! - [`money`] - Money type with integer arithmetic
//! - [`lifecycle`] - Order and sale status transition tables
//! - [`pricing`] - Line totals, order/sale totals, estimated preparation time
//! - [`stock`] - Stock demand aggregation and availability checks
//! - [`stats`] - Date windows and statistics shapes
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use store_core::lifecycle::order_transition_allowed;
//! use store_core::{DeliveryType, OrderStatus};
//!
//! assert!(order_transition_allowed(
//!     OrderStatus::Received,
//!     OrderStatus::Confirmed,
//!     DeliveryType::Delivery,
//! ));
//! assert!(!order_transition_allowed(
//!     OrderStatus::Delivered,
//!     OrderStatus::Canceled,
//!     DeliveryType::Delivery,
//! ));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod stats;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Base preparation time in minutes for every order.
pub const BASE_PREPARATION_MINUTES: i64 = 15;

/// Extra minutes added per line item.
pub const MINUTES_PER_ITEM: i64 = 5;

/// Extra minutes added when the order goes out for delivery.
pub const DELIVERY_EXTRA_MINUTES: i64 = 20;

/// How long an order may sit in `ready` before it is reported as urgent.
pub const URGENT_READY_MINUTES: i64 = 30;

/// Upper bound for a product price, in cents (1,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Upper bound for a stocked quantity.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000;
