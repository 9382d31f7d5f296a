//! Manual stock management. Order and sale flows adjust stock through
//! [`StockKeeper`](super::stock::StockKeeper) instead.

use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use store_core::validation::{validate_id, validate_stock_quantity};
use store_core::{Inventory, ValidationError};
use store_db::Database;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventory {
    pub product_id: i64,
    pub quantity: i64,
}

impl CreateInventory {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("productId", self.product_id)?;
        validate_stock_quantity(self.quantity, 1)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventory {
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    /// Creates the stock record of a product that has none.
    pub async fn create(&self, input: CreateInventory) -> AppResult<Inventory> {
        input.validate()?;

        if self.db.products().get_by_id(input.product_id).await?.is_none() {
            return Err(AppError::not_found("Product", input.product_id));
        }
        if self
            .db
            .inventory()
            .get_by_product(input.product_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Product {} already has an inventory record",
                input.product_id
            )));
        }

        let record = self
            .db
            .inventory()
            .insert(input.product_id, input.quantity)
            .await?;

        info!(inventory_id = record.id, product_id = record.product_id, "Inventory created");
        Ok(record)
    }

    pub async fn list(&self) -> AppResult<Vec<Inventory>> {
        Ok(self.db.inventory().list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Inventory> {
        self.db
            .inventory()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Inventory", id))
    }

    pub async fn get_by_product(&self, product_id: i64) -> AppResult<Inventory> {
        self.db
            .inventory()
            .get_by_product(product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Inventory for product", product_id))
    }

    /// Overwrites the quantity. The new value must differ from the current one.
    pub async fn update(&self, id: i64, input: UpdateInventory) -> AppResult<Inventory> {
        validate_stock_quantity(input.quantity, 0)?;
        let current = self.get(id).await?;

        if current.quantity == input.quantity {
            return Err(ValidationError::Unchanged {
                field: "quantity".to_string(),
            }
            .into());
        }

        let record = self.db.inventory().set_quantity(id, input.quantity).await?;
        info!(
            inventory_id = id,
            from = current.quantity,
            to = record.quantity,
            "Inventory updated"
        );
        Ok(record)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.db.inventory().delete(id).await? {
            return Err(AppError::not_found("Inventory", id));
        }
        info!(inventory_id = id, "Inventory deleted");
        Ok(())
    }
}
