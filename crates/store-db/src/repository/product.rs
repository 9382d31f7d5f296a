//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Product and Inventory Go Together
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert_with_inventory()          delete()                              │
//! │  ─────────────────────────        ──────────────────────                │
//! │  BEGIN                            BEGIN                                 │
//! │    INSERT products                  DELETE inventory WHERE product_id   │
//! │    INSERT inventory (qty)           DELETE products WHERE id            │
//! │  COMMIT                           COMMIT                                │
//! │                                                                         │
//! │  A product never exists without its stock record, and never leaves     │
//! │  one behind.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use store_core::{Inventory, Product};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, user_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub user_id: i64,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its unique name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a product together with its inventory record.
    ///
    /// ## Returns
    /// * `Ok((Product, Inventory))` - Both rows as stored
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert_with_inventory(
        &self,
        product: &NewProduct,
        initial_quantity: i64,
    ) -> DbResult<(Product, Inventory)> {
        debug!(name = %product.name, quantity = initial_quantity, "Inserting product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, description, price_cents, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.user_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.name),
            other => other,
        })?;

        let inventory = sqlx::query_as::<_, Inventory>(
            r#"
            INSERT INTO inventory (product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING id, product_id, quantity, created_at, updated_at
            "#,
        )
        .bind(created.id)
        .bind(initial_quantity)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((created, inventory))
    }

    /// Applies a partial update and returns the stored row.
    pub async fn update(&self, id: i64, changes: &ProductChanges) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                price_cents = COALESCE(?4, price_cents),
                updated_at = ?5
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price_cents)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product and its inventory record.
    ///
    /// Returns false if the product did not exist.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM inventory WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
