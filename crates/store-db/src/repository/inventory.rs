//! # Inventory Repository
//!
//! Stock records, one per product, and the debit/credit adjustment used by
//! the order and sale lifecycles.
//!
//! ## Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adjust([(product, qty), ...], Debit | Credit)                          │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    for each line:                                                       │
//! │      SELECT quantity FROM inventory WHERE product_id = ?                │
//! │        ├─ missing  → warn!, skip                                        │
//! │        └─ found    → UPDATE quantity = current ∓ qty                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  No bound checks here. Availability is checked by the caller before     │
//! │  the adjustment runs.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use store_core::stock::StockDirection;
use store_core::Inventory;

const INVENTORY_COLUMNS: &str = "id, product_id, quantity, created_at, updated_at";

/// Repository for inventory database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Inventory>> {
        let records = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory ORDER BY product_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Inventory>> {
        let record = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets the stock record of a product.
    pub async fn get_by_product(&self, product_id: i64) -> DbResult<Option<Inventory>> {
        let record = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE product_id = ?1"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Creates the stock record of a product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - The product already has one
    /// * `Err(DbError::ForeignKeyViolation)` - The product does not exist
    pub async fn insert(&self, product_id: i64, quantity: i64) -> DbResult<Inventory> {
        debug!(product_id = %product_id, quantity = quantity, "Inserting inventory");

        let record = sqlx::query_as::<_, Inventory>(&format!(
            r#"
            INSERT INTO inventory (product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, product_id.to_string()),
            other => other,
        })?;

        Ok(record)
    }

    /// Overwrites the quantity of a record.
    pub async fn set_quantity(&self, id: i64, quantity: i64) -> DbResult<Inventory> {
        debug!(id = %id, quantity = quantity, "Setting inventory quantity");

        let record = sqlx::query_as::<_, Inventory>(&format!(
            r#"
            UPDATE inventory SET quantity = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or_else(|| DbError::not_found("Inventory", id))
    }

    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id = %id, "Deleting inventory");

        let result = sqlx::query("DELETE FROM inventory WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Applies a debit or credit to every (product id, quantity) line.
    ///
    /// All lines are applied in one transaction. Lines whose product has no
    /// stock record are skipped.
    ///
    /// ## Returns
    /// Number of records actually updated.
    pub async fn adjust(&self, lines: &[(i64, i64)], direction: StockDirection) -> DbResult<usize> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;

        for &(product_id, quantity) in lines {
            let current: Option<i64> =
                sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some(current) = current else {
                warn!(
                    product_id = %product_id,
                    direction = direction.as_str(),
                    "No inventory record, skipping adjustment"
                );
                continue;
            };

            let next = direction.apply(current, quantity);
            sqlx::query("UPDATE inventory SET quantity = ?2, updated_at = ?3 WHERE product_id = ?1")
                .bind(product_id)
                .bind(next)
                .bind(now)
                .execute(&mut *tx)
                .await?;

            debug!(
                product_id = %product_id,
                direction = direction.as_str(),
                from = current,
                to = next,
                "Inventory adjusted"
            );
            updated += 1;
        }

        tx.commit().await?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::NewProduct;
    use crate::repository::user::NewUser;
    use crate::{Database, DbConfig};

    async fn setup_product(db: &Database, name: &str, quantity: i64) -> i64 {
        let owner = match db.users().get_by_email("owner@example.com").await.unwrap() {
            Some(user) => user,
            None => db
                .users()
                .insert(&NewUser {
                    name: "Owner".to_string(),
                    email: "owner@example.com".to_string(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap(),
        };

        let (product, _) = db
            .products()
            .insert_with_inventory(
                &NewProduct {
                    name: name.to_string(),
                    description: "Test product".to_string(),
                    price_cents: 500,
                    user_id: owner.id,
                },
                quantity,
            )
            .await
            .unwrap();
        product.id
    }

    async fn quantity_of(db: &Database, product_id: i64) -> i64 {
        db.inventory()
            .get_by_product(product_id)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    #[tokio::test]
    async fn test_debit_then_credit_restores() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let coffee = setup_product(&db, "Coffee", 10).await;
        let tea = setup_product(&db, "Tea", 4).await;
        let repo = db.inventory();

        let lines = [(coffee, 3), (tea, 4)];
        assert_eq!(repo.adjust(&lines, StockDirection::Debit).await.unwrap(), 2);
        assert_eq!(quantity_of(&db, coffee).await, 7);
        assert_eq!(quantity_of(&db, tea).await, 0);

        repo.adjust(&lines, StockDirection::Credit).await.unwrap();
        assert_eq!(quantity_of(&db, coffee).await, 10);
        assert_eq!(quantity_of(&db, tea).await, 4);
    }

    #[tokio::test]
    async fn test_adjust_skips_missing_records() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let coffee = setup_product(&db, "Coffee", 10).await;

        let updated = db
            .inventory()
            .adjust(&[(999, 1), (coffee, 2)], StockDirection::Debit)
            .await
            .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(quantity_of(&db, coffee).await, 8);
    }

    #[tokio::test]
    async fn test_repeated_lines_accumulate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let coffee = setup_product(&db, "Coffee", 10).await;

        db.inventory()
            .adjust(&[(coffee, 2), (coffee, 3)], StockDirection::Debit)
            .await
            .unwrap();
        assert_eq!(quantity_of(&db, coffee).await, 5);
    }

    #[tokio::test]
    async fn test_one_record_per_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let coffee = setup_product(&db, "Coffee", 1).await;

        let err = db.inventory().insert(coffee, 5).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_insert_for_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.inventory().insert(42, 5).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_set_quantity_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let coffee = setup_product(&db, "Coffee", 1).await;
        let repo = db.inventory();
        let record = repo.get_by_product(coffee).await.unwrap().unwrap();

        let updated = repo.set_quantity(record.id, 40).await.unwrap();
        assert_eq!(updated.quantity, 40);

        assert!(repo.delete(record.id).await.unwrap());
        assert!(repo.get_by_id(record.id).await.unwrap().is_none());
        assert!(matches!(
            repo.set_quantity(record.id, 1).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
