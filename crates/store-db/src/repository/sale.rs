//! # Sale Repository
//!
//! Sale documents, laid out like orders: JSON body plus projection columns.
//! `order_id` carries a unique index, so a second sale for the same order
//! fails with [`DbError::UniqueViolation`].

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{millis, window_bounds};
use crate::error::{DbError, DbResult};
use store_core::stats::{DateWindow, SaleStatistics};
use store_core::{Money, Sale, SaleStatus};

/// Repository for sale documents.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Stores a new sale document.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Another sale already references the order
    pub async fn create(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, order_id = ?sale.order_id, "Creating sale");

        let body = serde_json::to_string(sale)?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, client_id, seller_id, status, order_id,
                total_cents, item_count, created_at, body
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.client_id)
        .bind(sale.seller_id)
        .bind(sale.status.as_str())
        .bind(sale.order_id.as_deref())
        .bind(sale.total_cents)
        .bind(sale.items.len() as i64)
        .bind(millis(sale.created_at))
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, sale.order_id.clone().unwrap_or_default())
            }
            other => other,
        })?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let body: Option<String> = sqlx::query_scalar("SELECT body FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        body.map(|b| decode(&b)).transpose()
    }

    /// Rewrites a whole document.
    pub async fn replace(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, status = %sale.status, "Replacing sale");

        let mut conn = self.pool.acquire().await?;
        write_row(&mut conn, sale).await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: SaleStatus,
        at: DateTime<Utc>,
    ) -> DbResult<Sale> {
        debug!(id = %id, status = %status, "Updating sale status");

        let mut tx = self.pool.begin().await?;

        let body: Option<String> = sqlx::query_scalar("SELECT body FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(body) = body else {
            return Err(DbError::not_found("Sale", id));
        };

        let mut sale = decode(&body)?;
        sale.status = status;
        sale.updated_at = at;
        write_row(&mut tx, &sale).await?;

        tx.commit().await?;
        Ok(sale)
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn list_all(&self) -> DbResult<Vec<Sale>> {
        let bodies: Vec<String> =
            sqlx::query_scalar("SELECT body FROM sales ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        decode_all(bodies)
    }

    pub async fn find_by_client(&self, client_id: i64) -> DbResult<Vec<Sale>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM sales WHERE client_id = ?1 ORDER BY created_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    pub async fn find_by_seller(&self, seller_id: i64) -> DbResult<Vec<Sale>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM sales WHERE seller_id = ?1 ORDER BY created_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    pub async fn find_by_status(&self, status: SaleStatus) -> DbResult<Vec<Sale>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM sales WHERE status = ?1 ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    /// The sale derived from `order_id`, if any.
    pub async fn find_by_order(&self, order_id: &str) -> DbResult<Option<Sale>> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM sales WHERE order_id = ?1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        body.map(|b| decode(&b)).transpose()
    }

    pub async fn find_by_date_range(&self, window: &DateWindow) -> DbResult<Vec<Sale>> {
        let (start, end) = window_bounds(window);

        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM sales
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    pub async fn find_by_product(&self, product_id: i64) -> DbResult<Vec<Sale>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM sales
            WHERE EXISTS (
                SELECT 1 FROM json_each(sales.body, '$.items')
                WHERE json_extract(value, '$.productId') = ?1
            )
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    /// Count, revenue, average ticket and line items over the window.
    /// Every status is counted.
    pub async fn statistics(&self, window: &DateWindow) -> DbResult<SaleStatistics> {
        let (start, end) = window_bounds(window);

        let (count, revenue, items): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0), COALESCE(SUM(item_count), 0)
            FROM sales
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(SaleStatistics::new(count, Money::from_cents(revenue), items))
    }
}

fn decode(body: &str) -> DbResult<Sale> {
    Ok(serde_json::from_str(body)?)
}

fn decode_all(bodies: Vec<String>) -> DbResult<Vec<Sale>> {
    bodies.iter().map(|b| decode(b)).collect()
}

async fn write_row(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    let body = serde_json::to_string(sale)?;

    let result = sqlx::query(
        r#"
        UPDATE sales SET
            client_id = ?2,
            seller_id = ?3,
            status = ?4,
            order_id = ?5,
            total_cents = ?6,
            item_count = ?7,
            body = ?8
        WHERE id = ?1
        "#,
    )
    .bind(&sale.id)
    .bind(sale.client_id)
    .bind(sale.seller_id)
    .bind(sale.status.as_str())
    .bind(sale.order_id.as_deref())
    .bind(sale.total_cents)
    .bind(sale.items.len() as i64)
    .bind(body)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", &sale.id));
    }
    Ok(())
}
