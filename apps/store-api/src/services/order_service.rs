//! # Order Service
//!
//! Creation, status changes, cancellation and the order reports.
//!
//! ## Create Flow
//! ```text
//! CreateOrder
//!     │ validate input (ids, quantities, amounts, address fields)
//!     ▼
//! client + seller exist ───────────────────────────────► NotFound
//!     │
//!     ▼  ┌──────────────── stock guard held ────────────────┐
//!     │  │ check_available (summed per product) ─► InsufficientStock
//!     │  │ delivery without address ───────────► ValidationError
//!     │  │ build items, totals, estimate                    │
//!     │  │ orders().create(doc)                             │
//!     │  │ debit(lines) ── fails ─► delete doc, surface err │
//!     │  └──────────────────────────────────────────────────┘
//!     ▼
//! re-read created document
//! ```
//!
//! Stock is credited back when an order is canceled, either through
//! [`OrderService::cancel`] or a status change to `canceled`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::stock::StockKeeper;
use super::user_service::require_user;
use crate::error::{AppError, AppResult};
use store_core::lifecycle::{
    check_order_transition, ensure_order_cancelable, urgent_cutoff,
};
use store_core::pricing::estimated_minutes;
use store_core::stats::{DateWindow, OrderStatistics, StatusSummary};
use store_core::validation::{
    validate_amount_cents, validate_delivery_address, validate_estimated_minutes, validate_id,
    validate_item_count, validate_price_cents, validate_quantity, validate_reason, validate_uuid,
};
use store_core::{
    new_document_id, DeliveryAddress, DeliveryType, Order, OrderItem, OrderStatus, PaymentMethod,
    ValidationError,
};
use store_db::{Database, DocumentStore};

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i64,
    /// Defaults to the product's current price.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub client_id: i64,
    pub seller_id: i64,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub delivery_fee_cents: i64,
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub estimated_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrder {
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
        }

        validate_amount_cents("discountCents", self.discount_cents)?;
        validate_amount_cents("deliveryFeeCents", self.delivery_fee_cents)?;
        if let Some(minutes) = self.estimated_minutes {
            validate_estimated_minutes(minutes)?;
        }
        if let Some(address) = &self.delivery_address {
            validate_delivery_address(address)?;
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

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEstimatedTime {
    pub estimated_minutes: i64,
}

// =============================================================================
// Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    docs: DocumentStore,
    stock: StockKeeper,
}

impl OrderService {
    pub fn new(db: Database, docs: DocumentStore, stock: StockKeeper) -> Self {
        OrderService { db, docs, stock }
    }

    /// Creates an order in `received` and debits its items from inventory.
    pub async fn create(&self, input: CreateOrder) -> AppResult<Order> {
        input.validate()?;

        let client = require_user(&self.db, input.client_id, "Client").await?;
        let seller = require_user(&self.db, input.seller_id, "Seller").await?;
        let lines = input.stock_lines();

        let _guard = self.stock.lock().await;
        let products = self.stock.check_available(&lines).await?;

        if input.delivery_type == DeliveryType::Delivery && input.delivery_address.is_none() {
            return Err(ValidationError::Required {
                field: "deliveryAddress".to_string(),
            }
            .into());
        }

        let items = input
            .items
            .into_iter()
            .map(|item| -> AppResult<OrderItem> {
                let product = products.get(&item.product_id).ok_or_else(|| {
                    AppError::internal(format!("product {} dropped from stock check", item.product_id))
                })?;
                Ok(OrderItem {
                    product_id: item.product_id,
                    product_name: product.name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents.unwrap_or(product.price_cents),
                    line_total_cents: 0,
                    note: item.note,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let estimate = input
            .estimated_minutes
            .unwrap_or_else(|| estimated_minutes(items.len(), input.delivery_type));
        let now = Utc::now();

        let mut order = Order {
            id: new_document_id(),
            client_id: client.id,
            client_name: client.name,
            client_email: client.email,
            items,
            subtotal_cents: 0,
            discount_cents: input.discount_cents,
            delivery_fee_cents: input.delivery_fee_cents,
            total_cents: 0,
            payment_method: input.payment_method,
            delivery_type: input.delivery_type,
            delivery_address: input.delivery_address,
            estimated_minutes: estimate,
            notes: input.notes,
            status: OrderStatus::Received,
            seller_id: seller.id,
            seller_name: seller.name,
            cancellation_reason: None,
            ready_at: None,
            created_at: now,
            updated_at: now,
        };
        order.recompute_totals()?;

        self.docs.orders().create(&order).await?;

        if let Err(err) = self.stock.debit(&lines).await {
            warn!(order_id = %order.id, "Stock debit failed, removing order");
            if let Err(cleanup) = self.docs.orders().delete(&order.id).await {
                error!(order_id = %order.id, error = %cleanup, "Failed to remove order after debit failure");
            }
            return Err(err);
        }

        let created = self
            .docs
            .orders()
            .find_by_id(&order.id)
            .await?
            .ok_or_else(|| AppError::internal(format!("order {} missing after create", order.id)))?;

        info!(
            order_id = %created.id,
            client_id = created.client_id,
            total_cents = created.total_cents,
            items = created.items.len(),
            "Order created"
        );
        Ok(created)
    }

    /// Moves an order along its transition table.
    ///
    /// ## Returns
    /// The updated order. `canceled` credits the items back to inventory;
    /// `ready` stamps `readyAt`.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> AppResult<Order> {
        validate_uuid(id)?;

        let _guard = self.stock.lock().await;
        let order = self.get(id).await?;
        check_order_transition(order.status, status, order.delivery_type)?;

        if status == OrderStatus::Canceled {
            self.stock.credit(&order.stock_lines()).await?;
        }

        let updated = self
            .docs
            .orders()
            .update_status(id, status, Utc::now())
            .await?;

        info!(order_id = %id, from = %order.status, to = %status, "Order status updated");
        Ok(updated)
    }

    pub async fn update_estimated_time(&self, id: &str, minutes: i64) -> AppResult<Order> {
        validate_uuid(id)?;
        validate_estimated_minutes(minutes)?;

        let order = self
            .docs
            .orders()
            .update_estimated_minutes(id, minutes)
            .await?;

        info!(order_id = %id, minutes = minutes, "Order estimate updated");
        Ok(order)
    }

    /// Cancels an order and returns its items to inventory.
    pub async fn cancel(&self, id: &str, reason: &str) -> AppResult<Order> {
        validate_uuid(id)?;
        validate_reason(reason)?;

        let _guard = self.stock.lock().await;
        let mut order = self.get(id).await?;
        ensure_order_cancelable(order.status)?;

        self.stock.credit(&order.stock_lines()).await?;

        order.status = OrderStatus::Canceled;
        order.cancellation_reason = Some(reason.to_string());
        order.updated_at = Utc::now();
        self.docs.orders().replace(&order).await?;

        info!(order_id = %id, reason = %reason, "Order canceled");
        Ok(order)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn get(&self, id: &str) -> AppResult<Order> {
        validate_uuid(id)?;
        self.docs
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))
    }

    pub async fn list_all(&self) -> AppResult<Vec<Order>> {
        Ok(self.docs.orders().list_all().await?)
    }

    pub async fn by_client(&self, client_id: i64) -> AppResult<Vec<Order>> {
        Ok(self.docs.orders().find_by_client(client_id).await?)
    }

    pub async fn by_seller(&self, seller_id: i64) -> AppResult<Vec<Order>> {
        Ok(self.docs.orders().find_by_seller(seller_id).await?)
    }

    pub async fn by_status(&self, status: OrderStatus) -> AppResult<Vec<Order>> {
        Ok(self.docs.orders().find_by_status(status).await?)
    }

    pub async fn by_delivery_type(&self, delivery_type: DeliveryType) -> AppResult<Vec<Order>> {
        Ok(self.docs.orders().find_by_delivery_type(delivery_type).await?)
    }

    /// Orders created within `[start, end]`. Both bounds are required.
    pub async fn by_date_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Order>> {
        let window = DateWindow::bounded(start, end)?;
        Ok(self.docs.orders().find_by_date_range(&window).await?)
    }

    pub async fn by_product(&self, product_id: i64) -> AppResult<Vec<Order>> {
        Ok(self.docs.orders().find_by_product(product_id).await?)
    }

    /// Orders waiting in `ready` for longer than the urgency threshold.
    pub async fn urgent(&self) -> AppResult<Vec<Order>> {
        let cutoff = urgent_cutoff(Utc::now());
        Ok(self.docs.orders().find_urgent(cutoff).await?)
    }

    pub async fn in_preparation(&self) -> AppResult<Vec<Order>> {
        Ok(self.docs.orders().find_in_preparation().await?)
    }

    pub async fn statistics(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<OrderStatistics> {
        let window = DateWindow::new(start, end)?;
        Ok(self.docs.orders().statistics(&window).await?)
    }

    pub async fn status_summary(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<StatusSummary>> {
        let window = DateWindow::new(start, end)?;
        Ok(self.docs.orders().status_summary(&window).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::test_support::{reject_updates, Fixture};
    use chrono::Duration;

    fn service(fx: &Fixture) -> OrderService {
        OrderService::new(fx.db.clone(), fx.docs.clone(), fx.stock.clone())
    }

    fn item(product_id: i64, quantity: i64) -> OrderItemInput {
        OrderItemInput {
            product_id,
            quantity,
            unit_price_cents: None,
            note: None,
        }
    }

    fn pickup(fx: &Fixture, items: Vec<OrderItemInput>) -> CreateOrder {
        CreateOrder {
            client_id: fx.client.id,
            seller_id: fx.seller.id,
            items,
            discount_cents: 0,
            delivery_fee_cents: 0,
            delivery_type: DeliveryType::Pickup,
            delivery_address: None,
            payment_method: PaymentMethod::Cash,
            estimated_minutes: None,
            notes: None,
        }
    }

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            street: "Rua das Flores, 10".to_string(),
            district: "Centro".to_string(),
            city: "Curitiba".to_string(),
            state: "PR".to_string(),
            postal_code: "80000-000".to_string(),
            complement: None,
            phone: "+55 41 99999-0000".to_string(),
            instructions: None,
        }
    }

    #[tokio::test]
    async fn test_create_computes_totals_and_debits_stock() {
        let fx = Fixture::new().await;
        let orders = service(&fx);

        let mut input = pickup(&fx, vec![item(fx.coffee.id, 2), item(fx.tea.id, 1)]);
        input.delivery_fee_cents = 300;
        let order = orders.create(input).await.unwrap();

        assert_eq!(order.subtotal_cents, 2500);
        assert_eq!(order.total_cents, 2800);
        assert_eq!(order.status, OrderStatus::Received);
        assert_eq!(order.client_name, "Carla Client");
        assert_eq!(order.items[0].product_name, "Coffee");
        assert_eq!(order.items[0].line_total_cents, 2000);
        assert_eq!(order.estimated_minutes, 25);

        assert_eq!(fx.stock_of(fx.coffee.id).await, 8);
        assert_eq!(fx.stock_of(fx.tea.id).await, 4);
    }

    #[tokio::test]
    async fn test_cancel_restores_stock() {
        let fx = Fixture::new().await;
        let orders = service(&fx);
        let order = orders
            .create(pickup(&fx, vec![item(fx.coffee.id, 2), item(fx.tea.id, 1)]))
            .await
            .unwrap();

        let err = orders.cancel(&order.id, "  ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let canceled = orders.cancel(&order.id, "customer request").await.unwrap();
        assert_eq!(canceled.status, OrderStatus::Canceled);
        assert_eq!(canceled.cancellation_reason.as_deref(), Some("customer request"));
        assert_eq!(fx.stock_of(fx.coffee.id).await, 10);
        assert_eq!(fx.stock_of(fx.tea.id).await, 5);

        let err = orders.cancel(&order.id, "again").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(fx.stock_of(fx.coffee.id).await, 10);
    }

    #[tokio::test]
    async fn test_delivered_order_cannot_be_canceled() {
        let fx = Fixture::new().await;
        let orders = service(&fx);
        let order = orders
            .create(pickup(&fx, vec![item(fx.coffee.id, 1)]))
            .await
            .unwrap();

        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ] {
            orders.update_status(&order.id, status).await.unwrap();
        }

        let err = orders.cancel(&order.id, "too late").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(orders.get(&order.id).await.unwrap().status, OrderStatus::Delivered);
        assert_eq!(fx.stock_of(fx.coffee.id).await, 9);
    }

    #[tokio::test]
    async fn test_out_of_stock_leaves_inventory_untouched() {
        let fx = Fixture::new().await;
        let orders = service(&fx);

        let err = orders
            .create(pickup(&fx, vec![item(fx.coffee.id, 2), item(fx.cocoa.id, 1)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("Cocoa"));

        assert_eq!(fx.stock_of(fx.coffee.id).await, 10);
        assert!(orders.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_lines_are_summed() {
        let fx = Fixture::new().await;
        let orders = service(&fx);

        let err = orders
            .create(pickup(&fx, vec![item(fx.tea.id, 3), item(fx.tea.id, 3)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(fx.stock_of(fx.tea.id).await, 5);
    }

    #[tokio::test]
    async fn test_oversized_lines_and_fees_rejected() {
        let fx = Fixture::new().await;
        let orders = service(&fx);

        let mut huge = item(fx.coffee.id, i64::MAX);
        huge.unit_price_cents = Some(0);
        let mut one = item(fx.coffee.id, 1);
        one.unit_price_cents = Some(0);
        let err = orders.create(pickup(&fx, vec![huge, one])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut input = pickup(&fx, vec![item(fx.coffee.id, 1)]);
        input.delivery_fee_cents = i64::MAX;
        let err = orders.create(input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(fx.stock_of(fx.coffee.id).await, 10);
        assert!(orders.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_debit_removes_order() {
        let fx = Fixture::new().await;
        let orders = service(&fx);
        reject_updates(fx.db.pool(), "inventory").await;

        let err = orders
            .create(pickup(&fx, vec![item(fx.coffee.id, 2)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);

        assert!(orders.list_all().await.unwrap().is_empty());
        assert_eq!(fx.stock_of(fx.coffee.id).await, 10);
    }

    #[tokio::test]
    async fn test_delivery_needs_address() {
        let fx = Fixture::new().await;
        let orders = service(&fx);

        let mut input = pickup(&fx, vec![item(fx.coffee.id, 1)]);
        input.delivery_type = DeliveryType::Delivery;
        let err = orders.create(input.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(fx.stock_of(fx.coffee.id).await, 10);

        input.delivery_address = Some(address());
        let order = orders.create(input).await.unwrap();
        assert_eq!(order.estimated_minutes, 40);
        assert_eq!(order.delivery_address, Some(address()));
    }

    #[tokio::test]
    async fn test_unit_price_override_and_discount() {
        let fx = Fixture::new().await;
        let orders = service(&fx);

        let mut input = pickup(&fx, vec![item(fx.coffee.id, 3)]);
        input.items[0].unit_price_cents = Some(900);
        input.discount_cents = 200;
        input.estimated_minutes = Some(12);
        let order = orders.create(input).await.unwrap();

        assert_eq!(order.subtotal_cents, 2700);
        assert_eq!(order.total_cents, 2500);
        assert_eq!(order.estimated_minutes, 12);

        let mut input = pickup(&fx, vec![item(fx.tea.id, 1)]);
        input.discount_cents = 501;
        let err = orders.create(input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(fx.stock_of(fx.tea.id).await, 5);
    }

    #[tokio::test]
    async fn test_transition_rules() {
        let fx = Fixture::new().await;
        let orders = service(&fx);
        let order = orders
            .create(pickup(&fx, vec![item(fx.coffee.id, 1)]))
            .await
            .unwrap();

        let err = orders
            .update_status(&order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);

        let err = orders
            .update_status(&order.id, OrderStatus::OutForDelivery)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert!(err.message.contains("pickup"));

        let err = orders
            .update_status(&order.id, OrderStatus::Sold)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);

        assert_eq!(orders.get(&order.id).await.unwrap().status, OrderStatus::Received);
    }

    #[tokio::test]
    async fn test_ready_stamps_time_and_cancel_status_credits() {
        let fx = Fixture::new().await;
        let orders = service(&fx);
        let order = orders
            .create(pickup(&fx, vec![item(fx.tea.id, 2)]))
            .await
            .unwrap();

        orders.update_status(&order.id, OrderStatus::Confirmed).await.unwrap();
        orders.update_status(&order.id, OrderStatus::Preparing).await.unwrap();
        let ready = orders.update_status(&order.id, OrderStatus::Ready).await.unwrap();
        assert!(ready.ready_at.is_some());
        assert_eq!(fx.stock_of(fx.tea.id).await, 3);

        let canceled = orders
            .update_status(&order.id, OrderStatus::Canceled)
            .await
            .unwrap();
        assert_eq!(canceled.status, OrderStatus::Canceled);
        assert_eq!(fx.stock_of(fx.tea.id).await, 5);
    }

    #[tokio::test]
    async fn test_estimated_time_update() {
        let fx = Fixture::new().await;
        let orders = service(&fx);
        let order = orders
            .create(pickup(&fx, vec![item(fx.coffee.id, 1)]))
            .await
            .unwrap();

        let updated = orders.update_estimated_time(&order.id, 45).await.unwrap();
        assert_eq!(updated.estimated_minutes, 45);

        let err = orders.update_estimated_time(&order.id, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_date_range_is_validated() {
        let fx = Fixture::new().await;
        let orders = service(&fx);
        let now = Utc::now();

        let err = orders
            .by_date_range(Some(now), Some(now - Duration::days(1)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = orders.by_date_range(None, Some(now)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        orders
            .create(pickup(&fx, vec![item(fx.coffee.id, 1)]))
            .await
            .unwrap();
        let found = orders
            .by_date_range(Some(now - Duration::hours(1)), Some(Utc::now() + Duration::hours(1)))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_lookups() {
        let fx = Fixture::new().await;
        let orders = service(&fx);

        let err = orders
            .create(CreateOrder {
                client_id: 999,
                ..pickup(&fx, vec![item(fx.coffee.id, 1)])
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.starts_with("Client"));

        let order = orders
            .create(pickup(&fx, vec![item(fx.coffee.id, 1), item(fx.tea.id, 1)]))
            .await
            .unwrap();

        assert_eq!(orders.by_client(fx.client.id).await.unwrap().len(), 1);
        assert_eq!(orders.by_seller(fx.seller.id).await.unwrap().len(), 1);
        assert_eq!(orders.by_product(fx.tea.id).await.unwrap().len(), 1);
        assert!(orders.by_product(fx.cocoa.id).await.unwrap().is_empty());
        assert_eq!(
            orders.by_status(OrderStatus::Received).await.unwrap()[0].id,
            order.id
        );
        assert_eq!(
            orders.by_delivery_type(DeliveryType::Pickup).await.unwrap().len(),
            1
        );

        let stats = orders.statistics(None, None).await.unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.revenue_cents, 1500);
        assert_eq!(stats.item_count, 2);

        let summary = orders.status_summary(None, None).await.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].status, OrderStatus::Received);

        assert!(orders.urgent().await.unwrap().is_empty());
        assert!(orders.in_preparation().await.unwrap().is_empty());

        let missing = new_document_id();
        assert_eq!(orders.get(&missing).await.unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(
            orders.get("not-a-uuid").await.unwrap_err().code,
            ErrorCode::ValidationError
        );
    }
}
