//! # Order Repository
//!
//! Order documents: the whole order is stored as a JSON body, and the fields
//! used for filtering and aggregation are projected into indexed columns.
//!
//! ## Row Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders                                                                 │
//! │  ──────                                                                 │
//! │  id | client_id | seller_id | status | delivery_type | total_cents      │
//! │     | item_count | created_at (ms) | ready_at (ms) | body (JSON)        │
//! │                                                                         │
//! │  body is the source of truth. Every write rewrites the projections      │
//! │  from the same Order value, so they never drift.                        │
//! │                                                                         │
//! │  find_by_product  → json_each(body, '$.items')                          │
//! │  find_urgent      → status = 'ready' AND ready_at <= cutoff             │
//! │  statistics       → SUM/COUNT over projections                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lists are newest first unless stated otherwise.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{millis, window_bounds};
use crate::error::{DbError, DbResult};
use store_core::stats::{DateWindow, DeliveryTypeStatistics, OrderStatistics, StatusSummary};
use store_core::{DeliveryType, Money, Order, OrderStatus};

/// Repository for order documents.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Stores a new order document.
    pub async fn create(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, client_id = order.client_id, "Creating order");

        let body = serde_json::to_string(order)?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, client_id, seller_id, status, delivery_type,
                total_cents, item_count, created_at, ready_at, body
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&order.id)
        .bind(order.client_id)
        .bind(order.seller_id)
        .bind(order.status.as_str())
        .bind(order.delivery_type.as_str())
        .bind(order.total_cents)
        .bind(order.items.len() as i64)
        .bind(millis(order.created_at))
        .bind(order.ready_at.map(millis))
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let body: Option<String> = sqlx::query_scalar("SELECT body FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        body.map(|b| decode(&b)).transpose()
    }

    /// Rewrites a whole document.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No order with this id
    pub async fn replace(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, status = %order.status, "Replacing order");

        let mut conn = self.pool.acquire().await?;
        write_row(&mut conn, order).await
    }

    /// Sets the status and stamps `updated_at`. Entering `ready` also stamps
    /// `ready_at`.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> DbResult<Order> {
        debug!(id = %id, status = %status, "Updating order status");

        self.modify(id, |order| {
            order.status = status;
            order.updated_at = at;
            if status == OrderStatus::Ready {
                order.ready_at = Some(at);
            }
        })
        .await
    }

    pub async fn update_estimated_minutes(&self, id: &str, minutes: i64) -> DbResult<Order> {
        debug!(id = %id, minutes = minutes, "Updating estimated time");

        self.modify(id, |order| {
            order.estimated_minutes = minutes;
            order.updated_at = Utc::now();
        })
        .await
    }

    /// Deletes a document. Returns false if no row matched.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Read-modify-write of one document inside a transaction.
    async fn modify<F>(&self, id: &str, apply: F) -> DbResult<Order>
    where
        F: FnOnce(&mut Order),
    {
        let mut tx = self.pool.begin().await?;

        let body: Option<String> = sqlx::query_scalar("SELECT body FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(body) = body else {
            return Err(DbError::not_found("Order", id));
        };

        let mut order = decode(&body)?;
        apply(&mut order);
        write_row(&mut tx, &order).await?;

        tx.commit().await?;
        Ok(order)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let bodies: Vec<String> =
            sqlx::query_scalar("SELECT body FROM orders ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        decode_all(bodies)
    }

    pub async fn find_by_client(&self, client_id: i64) -> DbResult<Vec<Order>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM orders WHERE client_id = ?1 ORDER BY created_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    pub async fn find_by_seller(&self, seller_id: i64) -> DbResult<Vec<Order>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM orders WHERE seller_id = ?1 ORDER BY created_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    pub async fn find_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM orders WHERE status = ?1 ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    pub async fn find_by_delivery_type(&self, delivery_type: DeliveryType) -> DbResult<Vec<Order>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM orders WHERE delivery_type = ?1 ORDER BY created_at DESC",
        )
        .bind(delivery_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    /// Orders created inside the window, bounds inclusive.
    pub async fn find_by_date_range(&self, window: &DateWindow) -> DbResult<Vec<Order>> {
        let (start, end) = window_bounds(window);

        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM orders
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

    /// Orders with at least one line item for `product_id`.
    pub async fn find_by_product(&self, product_id: i64) -> DbResult<Vec<Order>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM orders
            WHERE EXISTS (
                SELECT 1 FROM json_each(orders.body, '$.items')
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

    /// Orders `ready` since `cutoff` or earlier, longest-waiting first.
    pub async fn find_urgent(&self, cutoff: DateTime<Utc>) -> DbResult<Vec<Order>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM orders
            WHERE status = 'ready' AND ready_at IS NOT NULL AND ready_at <= ?1
            ORDER BY ready_at ASC
            "#,
        )
        .bind(millis(cutoff))
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    /// Orders `confirmed` or `preparing`, oldest first.
    pub async fn find_in_preparation(&self) -> DbResult<Vec<Order>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM orders
            WHERE status IN ('confirmed', 'preparing')
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Count, revenue, average ticket and line items over the window, with
    /// the same figures split by delivery type. Every status is counted.
    pub async fn statistics(&self, window: &DateWindow) -> DbResult<OrderStatistics> {
        let (start, end) = window_bounds(window);

        let (count, revenue, items): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0), COALESCE(SUM(item_count), 0)
            FROM orders
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<(DeliveryType, i64, i64)> = sqlx::query_as(
            r#"
            SELECT delivery_type, COUNT(*), COALESCE(SUM(total_cents), 0)
            FROM orders
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            GROUP BY delivery_type
            ORDER BY delivery_type
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let by_delivery_type = rows
            .into_iter()
            .map(|(delivery_type, count, revenue_cents)| DeliveryTypeStatistics {
                delivery_type,
                count,
                revenue_cents,
            })
            .collect();

        Ok(OrderStatistics::new(
            count,
            Money::from_cents(revenue),
            items,
            by_delivery_type,
        ))
    }

    /// Count and revenue per status over the window, largest count first.
    pub async fn status_summary(&self, window: &DateWindow) -> DbResult<Vec<StatusSummary>> {
        let (start, end) = window_bounds(window);

        let rows: Vec<(OrderStatus, i64, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*) AS n, COALESCE(SUM(total_cents), 0)
            FROM orders
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            GROUP BY status
            ORDER BY n DESC, status
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(status, count, revenue_cents)| StatusSummary {
                status,
                count,
                revenue_cents,
            })
            .collect())
    }
}

// =============================================================================
// Row Helpers
// =============================================================================

fn decode(body: &str) -> DbResult<Order> {
    Ok(serde_json::from_str(body)?)
}

fn decode_all(bodies: Vec<String>) -> DbResult<Vec<Order>> {
    bodies.iter().map(|b| decode(b)).collect()
}

/// Rewrites body and projections of an existing row.
async fn write_row(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    let body = serde_json::to_string(order)?;

    let result = sqlx::query(
        r#"
        UPDATE orders SET
            client_id = ?2,
            seller_id = ?3,
            status = ?4,
            delivery_type = ?5,
            total_cents = ?6,
            item_count = ?7,
            ready_at = ?8,
            body = ?9
        WHERE id = ?1
        "#,
    )
    .bind(&order.id)
    .bind(order.client_id)
    .bind(order.seller_id)
    .bind(order.status.as_str())
    .bind(order.delivery_type.as_str())
    .bind(order.total_cents)
    .bind(order.items.len() as i64)
    .bind(order.ready_at.map(millis))
    .bind(body)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Order", &order.id));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
