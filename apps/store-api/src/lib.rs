//! # Store API
//!
//! REST server for the store manager: users, products, inventory, orders and
//! sales over two SQLite stores.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Store API                                     │
//! │                                                                         │
//! │  HTTP ──► routes ──► services ──┬──► Database      (users, products,    │
//! │   (axum + TraceLayer)           │                   inventory)          │
//! │                                 └──► DocumentStore (orders, sales)      │
//! │                                                                         │
//! │  errors: CoreError / DbError ──► AppError ──► {status:"error",message}  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Defaults, then an optional `store-api.toml`, then environment variables:
//! - `STORE_PORT` - HTTP port (default: 3000)
//! - `STORE_BIND_ADDR` - Bind address (default: 0.0.0.0)
//! - `STORE_DATABASE_PATH` - Relational store file (default: ./data/store.db)
//! - `STORE_DOCUMENTS_PATH` - Document store file (default: ./data/documents.db)
//! - `STORE_MAX_CONNECTIONS` - Pool size per store (default: 5)
//! - `RUST_LOG` - Log filter

pub mod config;
pub mod error;
pub mod extract;
pub mod password;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
