//! # Stock Keeper
//!
//! The inventory side of the order and sale lifecycles: availability checks
//! before a document is written, and the debit/credit afterwards.
//!
//! ## Check-then-Adjust Under One Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request A                         request B                            │
//! │  ─────────                         ─────────                            │
//! │  guard = stock.lock()  ◄── held    stock.lock() ... waits               │
//! │  check_available(lines)                                                 │
//! │  orders().create(doc)                                                   │
//! │  debit(lines)                                                           │
//! │  drop(guard)           ──────────► guard acquired                       │
//! │                                    check_available(lines) sees A's debit│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard is per process. Two processes writing the same database are not
//! serialized by it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{AppError, AppResult};
use store_core::stock::{aggregate_demand, check_available, check_reservation, StockDirection};
use store_core::{Inventory, Product};
use store_db::Database;

#[derive(Debug, Clone)]
pub struct StockKeeper {
    db: Database,
    guard: Arc<Mutex<()>>,
}

impl StockKeeper {
    pub fn new(db: Database) -> Self {
        StockKeeper {
            db,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Serializes check-and-adjust sequences within this process.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().await
    }

    /// Checks that every product exists, has a stock record and can cover
    /// the summed demand of its lines.
    ///
    /// Returns the products by id so callers can copy their names and prices.
    pub async fn check_available(&self, lines: &[(i64, i64)]) -> AppResult<HashMap<i64, Product>> {
        let demand = aggregate_demand(lines)?;
        let mut products = HashMap::with_capacity(demand.len());

        for (product_id, requested) in demand {
            let (product, inventory) = self.stock_of(product_id).await?;
            check_available(&product.name, inventory.quantity, requested)?;
            products.insert(product_id, product);
        }

        Ok(products)
    }

    /// Checks that stock debited earlier for `lines` is still backed.
    pub async fn check_reserved(&self, lines: &[(i64, i64)]) -> AppResult<()> {
        for (product_id, reserved) in aggregate_demand(lines)? {
            let (product, inventory) = self.stock_of(product_id).await?;
            check_reservation(&product.name, inventory.quantity, reserved)?;
        }
        Ok(())
    }

    pub async fn debit(&self, lines: &[(i64, i64)]) -> AppResult<()> {
        self.adjust(lines, StockDirection::Debit).await
    }

    pub async fn credit(&self, lines: &[(i64, i64)]) -> AppResult<()> {
        self.adjust(lines, StockDirection::Credit).await
    }

    async fn adjust(&self, lines: &[(i64, i64)], direction: StockDirection) -> AppResult<()> {
        let updated = self.db.inventory().adjust(lines, direction).await?;
        debug!(
            direction = direction.as_str(),
            lines = lines.len(),
            updated = updated,
            "Stock adjusted"
        );
        Ok(())
    }

    async fn stock_of(&self, product_id: i64) -> AppResult<(Product, Inventory)> {
        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", product_id))?;

        let inventory = self
            .db
            .inventory()
            .get_by_product(product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Inventory for product", &product.name))?;

        Ok((product, inventory))
    }
}
