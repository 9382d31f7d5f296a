//! # Sale Service
//!
//! Direct sales, sales derived from orders, and the payment lifecycle.
//!
//! ## Stock Movements
//! ```text
//! ┌────────────────────────┬──────────────────────────────────────────────┐
//! │ Operation              │ Inventory                                    │
//! ├────────────────────────┼──────────────────────────────────────────────┤
//! │ create (direct)        │ debit every item, status pending             │
//! │ create from order      │ none: the order already debited, status paid │
//! │ cancel / → canceled    │ credit every item                            │
//! │ refund / → refunded    │ credit every item                            │
//! └────────────────────────┴──────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::stock::StockKeeper;
use super::user_service::require_user;
use crate::error::{AppError, AppResult};
use store_core::lifecycle::{
    check_sale_transition, ensure_order_convertible, ensure_sale_cancelable,
    ensure_sale_refundable,
};
use store_core::stats::{DateWindow, SaleStatistics};
use store_core::validation::{
    validate_amount_cents, validate_id, validate_item_count, validate_price_cents,
    validate_quantity, validate_reason, validate_uuid,
};
use store_core::{
    new_document_id, OrderStatus, PaymentMethod, Sale, SaleItem, SaleStatus, ValidationError,
};
use store_db::{Database, DocumentStore};

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemInput {
    pub product_id: i64,
    pub quantity: i64,
    /// Defaults to the product's current price.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub discount_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSale {
    pub client_id: i64,
    pub seller_id: i64,
    pub items: Vec<SaleItemInput>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateSale {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("clientId", self.client_id)?;
        validate_id("sellerId", self.seller_id)?;
        validate_item_count(self.items.len())?;

        for item in &self.items {
            validate_id("productId", item.product_id)?;
            validate_quantity(item.quantity)?;
            if let Some(price) = item.unit_price_cents {
                validate_price_cents(price)?;
            }
            validate_amount_cents("discountCents", item.discount_cents)?;
        }
        Ok(())
    }

    fn stock_lines(&self) -> Vec<(i64, i64)> {
        self.items
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleFromOrder {
    pub order_id: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateSaleStatus {
    pub status: SaleStatus,
}

// =============================================================================
// Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct SaleService {
    db: Database,
    docs: DocumentStore,
    stock: StockKeeper,
}

impl SaleService {
    pub fn new(db: Database, docs: DocumentStore, stock: StockKeeper) -> Self {
        SaleService { db, docs, stock }
    }

    /// Records a direct sale in `pending` and debits its items.
    pub async fn create(&self, input: CreateSale) -> AppResult<Sale> {
        input.validate()?;

        let client = require_user(&self.db, input.client_id, "Client").await?;
        let seller = require_user(&self.db, input.seller_id, "Seller").await?;
        let lines = input.stock_lines();

        let _guard = self.stock.lock().await;
        let products = self.stock.check_available(&lines).await?;

        let items = input
            .items
            .into_iter()
            .map(|item| -> AppResult<SaleItem> {
                let product = products.get(&item.product_id).ok_or_else(|| {
                    AppError::internal(format!("product {} dropped from stock check", item.product_id))
                })?;
                Ok(SaleItem {
                    product_id: item.product_id,
                    product_name: product.name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents.unwrap_or(product.price_cents),
                    line_total_cents: 0,
                    discount_cents: item.discount_cents,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let now = Utc::now();
        let mut sale = Sale {
            id: new_document_id(),
            client_id: client.id,
            client_name: client.name,
            client_email: client.email,
            seller_id: seller.id,
            seller_name: seller.name,
            items,
            subtotal_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            payment_method: input.payment_method,
            status: SaleStatus::Pending,
            order_id: None,
            notes: input.notes,
            reason: None,
            created_at: now,
            updated_at: now,
        };
        sale.recompute_totals()?;

        self.docs.sales().create(&sale).await?;

        if let Err(err) = self.stock.debit(&lines).await {
            warn!(sale_id = %sale.id, "Stock debit failed, removing sale");
            if let Err(cleanup) = self.docs.sales().delete(&sale.id).await {
                error!(sale_id = %sale.id, error = %cleanup, "Failed to remove sale after debit failure");
            }
            return Err(err);
        }

        let created = self
            .docs
            .sales()
            .find_by_id(&sale.id)
            .await?
            .ok_or_else(|| AppError::internal(format!("sale {} missing after create", sale.id)))?;

        info!(
            sale_id = %created.id,
            client_id = created.client_id,
            total_cents = created.total_cents,
            "Sale created"
        );
        Ok(created)
    }

    /// Converts an order into a `paid` sale and marks the order `sold`.
    ///
    /// The order's stock was debited when it was placed, so nothing is
    /// debited here. Each product must still exist with a non-negative stock.
    ///
    /// ## When This Fails
    /// ```text
    /// order missing ─────────────────────► NotFound
    /// order already has a sale ──────────► Conflict
    /// order delivered/canceled/sold ─────► InvalidState
    /// product or inventory gone ─────────► NotFound
    /// stock below zero ──────────────────► InsufficientStock
    /// ```
    pub async fn create_from_order(&self, order_id: &str) -> AppResult<Sale> {
        validate_uuid(order_id)?;

        let _guard = self.stock.lock().await;
        let mut order = self
            .docs
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order", order_id))?;

        if self.docs.sales().find_by_order(order_id).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Order {order_id} was already converted into a sale"
            )));
        }
        ensure_order_convertible(order.status)?;
        self.stock.check_reserved(&order.stock_lines()).await?;

        let now = Utc::now();
        let mut sale = Sale {
            id: new_document_id(),
            client_id: order.client_id,
            client_name: order.client_name.clone(),
            client_email: order.client_email.clone(),
            seller_id: order.seller_id,
            seller_name: order.seller_name.clone(),
            items: order
                .items
                .iter()
                .map(|item| SaleItem {
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                    line_total_cents: item.line_total_cents,
                    discount_cents: 0,
                })
                .collect(),
            subtotal_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            payment_method: order.payment_method,
            status: SaleStatus::Paid,
            order_id: Some(order.id.clone()),
            notes: order.notes.clone(),
            reason: None,
            created_at: now,
            updated_at: now,
        };
        sale.recompute_totals()?;

        self.docs.sales().create(&sale).await?;

        order.status = OrderStatus::Sold;
        order.updated_at = now;
        if let Err(err) = self.docs.orders().replace(&order).await {
            warn!(sale_id = %sale.id, order_id = %order_id, "Marking order sold failed, removing sale");
            if let Err(cleanup) = self.docs.sales().delete(&sale.id).await {
                error!(sale_id = %sale.id, error = %cleanup, "Failed to remove sale after order update failure");
            }
            return Err(err.into());
        }

        info!(sale_id = %sale.id, order_id = %order_id, total_cents = sale.total_cents, "Sale created from order");
        Ok(sale)
    }

    /// Moves a sale along its transition table. `canceled` and `refunded`
    /// credit the items back to inventory.
    pub async fn update_status(&self, id: &str, status: SaleStatus) -> AppResult<Sale> {
        validate_uuid(id)?;

        let _guard = self.stock.lock().await;
        let sale = self.get(id).await?;
        check_sale_transition(sale.status, status)?;

        if status.credits_stock() {
            self.stock.credit(&sale.stock_lines()).await?;
        }

        let updated = self
            .docs
            .sales()
            .update_status(id, status, Utc::now())
            .await?;

        info!(sale_id = %id, from = %sale.status, to = %status, "Sale status updated");
        Ok(updated)
    }

    /// Cancels a pending sale and credits its items.
    pub async fn cancel(&self, id: &str, reason: &str) -> AppResult<Sale> {
        self.close(id, reason, SaleStatus::Canceled).await
    }

    /// Refunds a paid sale and credits its items.
    pub async fn refund(&self, id: &str, reason: &str) -> AppResult<Sale> {
        self.close(id, reason, SaleStatus::Refunded).await
    }

    async fn close(&self, id: &str, reason: &str, status: SaleStatus) -> AppResult<Sale> {
        validate_uuid(id)?;
        validate_reason(reason)?;

        let _guard = self.stock.lock().await;
        let mut sale = self.get(id).await?;
        match status {
            SaleStatus::Refunded => ensure_sale_refundable(sale.status)?,
            _ => ensure_sale_cancelable(sale.status)?,
        }

        self.stock.credit(&sale.stock_lines()).await?;

        sale.status = status;
        sale.reason = Some(reason.to_string());
        sale.updated_at = Utc::now();
        self.docs.sales().replace(&sale).await?;

        info!(sale_id = %id, status = %status, reason = %reason, "Sale closed");
        Ok(sale)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn get(&self, id: &str) -> AppResult<Sale> {
        validate_uuid(id)?;
        self.docs
            .sales()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Sale", id))
    }

    pub async fn list_all(&self) -> AppResult<Vec<Sale>> {
        Ok(self.docs.sales().list_all().await?)
    }

    pub async fn by_client(&self, client_id: i64) -> AppResult<Vec<Sale>> {
        Ok(self.docs.sales().find_by_client(client_id).await?)
    }

    pub async fn by_seller(&self, seller_id: i64) -> AppResult<Vec<Sale>> {
        Ok(self.docs.sales().find_by_seller(seller_id).await?)
    }

    pub async fn by_status(&self, status: SaleStatus) -> AppResult<Vec<Sale>> {
        Ok(self.docs.sales().find_by_status(status).await?)
    }

    /// The sale derived from `order_id`.
    pub async fn by_order(&self, order_id: &str) -> AppResult<Sale> {
        validate_uuid(order_id)?;
        self.docs
            .sales()
            .find_by_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Sale for order", order_id))
    }

    pub async fn by_date_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Sale>> {
        let window = DateWindow::bounded(start, end)?;
        Ok(self.docs.sales().find_by_date_range(&window).await?)
    }

    pub async fn by_product(&self, product_id: i64) -> AppResult<Vec<Sale>> {
        Ok(self.docs.sales().find_by_product(product_id).await?)
    }

    pub async fn statistics(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<SaleStatistics> {
        let window = DateWindow::new(start, end)?;
        Ok(self.docs.sales().statistics(&window).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
