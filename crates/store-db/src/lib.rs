//! # store-db: Database Layer for the Store Manager
//!
//! SQLite persistence for both stores, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Store Manager Data Flow                          │
//! │                                                                         │
//! │  HTTP handler ─► service (OrderService::create)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     store-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │ UserRepo       │   │ relational/  │   │   │
//! │  │   │ DocumentStore │◄───│ ProductRepo    │   │ documents/   │   │   │
//! │  │   │   (pool.rs)   │    │ InventoryRepo  │   │  (embedded)  │   │   │
//! │  │   │               │    │ OrderRepo      │   │              │   │   │
//! │  │   │               │    │ SaleRepo       │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.db (users, products, inventory)   documents.db (orders, sales)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Store handles and pool configuration
//! - [`migrations`] - Embedded migrations, one set per store
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use store_db::{Database, DbConfig, DocumentStore};
//!
//! let db = Database::new(DbConfig::new("./data/store.db")).await?;
//! let docs = DocumentStore::new(DbConfig::new("./data/documents.db")).await?;
//!
//! let stock = db.inventory().get_by_product(7).await?;
//! let ready = docs.orders().find_by_status(OrderStatus::Ready).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DocumentStore};

// Repository re-exports for convenience
pub use repository::inventory::InventoryRepository;
pub use repository::order::OrderRepository;
pub use repository::product::{NewProduct, ProductChanges, ProductRepository};
pub use repository::sale::SaleRepository;
pub use repository::user::{NewUser, UserChanges, UserRepository};
