//! # Pricing
//!
//! Totals and estimated preparation time.
//!
//! ```text
//! Order:  line_total = quantity × unit_price
//!         subtotal   = Σ line_total
//!         total      = subtotal − discount + delivery_fee
//!
//! Sale:   line_total = quantity × unit_price
//!         subtotal   = Σ line_total
//!         discount   = Σ item discount
//!         total      = subtotal − discount
//! ```
//!
//! Totals are recomputed from the items every time a document is built,
//! never trusted from the client.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{DeliveryType, Order, OrderItem, Sale, SaleItem};
use crate::{BASE_PREPARATION_MINUTES, DELIVERY_EXTRA_MINUTES, MINUTES_PER_ITEM};

fn overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

/// Sums cent amounts, failing instead of wrapping.
fn checked_sum(field: &str, mut cents: impl Iterator<Item = i64>) -> CoreResult<Money> {
    cents.try_fold(Money::zero(), |acc, value| {
        acc.checked_add(Money::from_cents(value))
            .ok_or_else(|| overflow(field))
    })
}

/// quantity × unit price.
#[inline]
pub fn line_total(unit_price: Money, quantity: i64) -> CoreResult<Money> {
    unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| overflow("lineTotal"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub total: Money,
}

/// Computes order totals from already-priced line items.
pub fn order_totals(
    items: &[OrderItem],
    discount: Money,
    delivery_fee: Money,
) -> CoreResult<OrderTotals> {
    let subtotal = checked_sum("subtotal", items.iter().map(|item| item.line_total_cents))?;
    let total = subtotal
        .checked_sub(discount)
        .and_then(|net| net.checked_add(delivery_fee))
        .ok_or_else(|| overflow("total"))?;

    Ok(OrderTotals { subtotal, total })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

pub fn sale_totals(items: &[SaleItem]) -> CoreResult<SaleTotals> {
    let subtotal = checked_sum("subtotal", items.iter().map(|item| item.line_total_cents))?;
    let discount = checked_sum("discount", items.iter().map(|item| item.discount_cents))?;
    let total = subtotal
        .checked_sub(discount)
        .ok_or_else(|| overflow("total"))?;

    Ok(SaleTotals {
        subtotal,
        discount,
        total,
    })
}

/// Default preparation estimate when the client does not send one.
///
/// 15 minutes, plus 5 per line item, plus 20 for delivery.
pub fn estimated_minutes(item_count: usize, delivery_type: DeliveryType) -> i64 {
    let mut minutes = BASE_PREPARATION_MINUTES + MINUTES_PER_ITEM * item_count as i64;
    if delivery_type == DeliveryType::Delivery {
        minutes += DELIVERY_EXTRA_MINUTES;
    }
    minutes
}

impl Order {
    /// Recomputes line totals, subtotal and total from the items.
    ///
    /// Fails if the resulting total is negative.
    pub fn recompute_totals(&mut self) -> CoreResult<()> {
        for item in &mut self.items {
            item.line_total_cents =
                line_total(Money::from_cents(item.unit_price_cents), item.quantity)?.cents();
        }

        let totals = order_totals(
            &self.items,
            Money::from_cents(self.discount_cents),
            Money::from_cents(self.delivery_fee_cents),
        )?;
        if totals.total.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: totals.subtotal.cents().saturating_add(self.delivery_fee_cents),
            }
            .into());
        }

        self.subtotal_cents = totals.subtotal.cents();
        self.total_cents = totals.total.cents();
        Ok(())
    }
}

impl Sale {
    /// Recomputes line totals, subtotal, discount and total from the items.
    pub fn recompute_totals(&mut self) -> CoreResult<()> {
        for item in &mut self.items {
            item.line_total_cents =
                line_total(Money::from_cents(item.unit_price_cents), item.quantity)?.cents();
        }

        let totals = sale_totals(&self.items)?;
        if totals.total.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: totals.subtotal.cents(),
            }
            .into());
        }

        self.subtotal_cents = totals.subtotal.cents();
        self.discount_cents = totals.discount.cents();
        self.total_cents = totals.total.cents();
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, PaymentMethod, SaleStatus};
    use chrono::Utc;

    fn order_item(product_id: i64, quantity: i64, unit_price_cents: i64) -> OrderItem {
        OrderItem {
            product_id,
            product_name: format!("P{product_id}"),
            quantity,
            unit_price_cents,
            line_total_cents: 0,
            note: None,
        }
    }

    fn sale_item(quantity: i64, unit_price_cents: i64, discount_cents: i64) -> SaleItem {
        SaleItem {
            product_id: 1,
            product_name: "P1".to_string(),
            quantity,
            unit_price_cents,
            line_total_cents: 0,
            discount_cents,
        }
    }

    fn order(items: Vec<OrderItem>, discount_cents: i64, delivery_fee_cents: i64) -> Order {
        let now = Utc::now();
        Order {
            id: "o-1".to_string(),
            client_id: 1,
            client_name: "Client".to_string(),
            client_email: "client@example.com".to_string(),
            items,
            subtotal_cents: 0,
            discount_cents,
            delivery_fee_cents,
            total_cents: 0,
            payment_method: PaymentMethod::Cash,
            delivery_type: DeliveryType::Delivery,
            delivery_address: None,
            estimated_minutes: 0,
            notes: None,
            status: OrderStatus::Received,
            seller_id: 2,
            seller_name: "Seller".to_string(),
            cancellation_reason: None,
            ready_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_order_example_totals() {
        // 2 × 10.00 + 1 × 5.00, no discount, 3.00 delivery fee
        let mut order = order(vec![order_item(1, 2, 1000), order_item(2, 1, 500)], 0, 300);
        order.recompute_totals().unwrap();

        assert_eq!(order.items[0].line_total_cents, 2000);
        assert_eq!(order.items[1].line_total_cents, 500);
        assert_eq!(order.subtotal_cents, 2500);
        assert_eq!(order.total_cents, 2800);
    }

    #[test]
    fn test_order_discount_applied() {
        let mut order = order(vec![order_item(1, 3, 1000)], 500, 0);
        order.recompute_totals().unwrap();
        assert_eq!(order.total_cents, 2500);
    }

    #[test]
    fn test_order_negative_total_rejected() {
        let mut order = order(vec![order_item(1, 1, 1000)], 5000, 0);
        assert!(order.recompute_totals().is_err());
    }

    #[test]
    fn test_order_overflow_rejected() {
        let mut huge_line = order(vec![order_item(1, i64::MAX, 2)], 0, 0);
        assert!(huge_line.recompute_totals().is_err());

        let mut huge_fee = order(vec![order_item(1, 1, 1000)], 0, i64::MAX);
        let err = huge_fee.recompute_totals().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn test_sale_totals() {
        let now = Utc::now();
        let mut sale = Sale {
            id: "s-1".to_string(),
            client_id: 1,
            client_name: "Client".to_string(),
            client_email: "client@example.com".to_string(),
            seller_id: 2,
            seller_name: "Seller".to_string(),
            items: vec![sale_item(2, 1000, 200), sale_item(1, 500, 0)],
            subtotal_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            payment_method: PaymentMethod::Pix,
            status: SaleStatus::Pending,
            order_id: None,
            notes: None,
            reason: None,
            created_at: now,
            updated_at: now,
        };
        sale.recompute_totals().unwrap();

        assert_eq!(sale.subtotal_cents, 2500);
        assert_eq!(sale.discount_cents, 200);
        assert_eq!(sale.total_cents, 2300);
        let line_sum: i64 = sale.items.iter().map(|i| i.line_total_cents).sum();
        assert_eq!(sale.total_cents, line_sum - 200);
    }

    #[test]
    fn test_estimated_minutes() {
        assert_eq!(estimated_minutes(2, DeliveryType::Pickup), 25);
        assert_eq!(estimated_minutes(2, DeliveryType::Delivery), 45);
        assert_eq!(estimated_minutes(0, DeliveryType::Pickup), 15);
    }
}
