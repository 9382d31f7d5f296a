//! # Lifecycle Rules
//!
//! Status transition tables for orders and sales, plus the status guards
//! used by cancel, refund and sale derivation.
//!
//! ## Order Transitions
//! ```text
//! ┌──────────────────┬───────────────────────────────────────────────────┐
//! │ from             │ allowed next                                      │
//! ├──────────────────┼───────────────────────────────────────────────────┤
//! │ received         │ confirmed, canceled                               │
//! │ confirmed        │ preparing, canceled                               │
//! │ preparing        │ ready, canceled                                   │
//! │ ready (delivery) │ out_for_delivery, canceled                        │
//! │ ready (pickup)   │ delivered, canceled                               │
//! │ out_for_delivery │ delivered, canceled                               │
//! │ delivered        │ -                                                 │
//! │ canceled         │ -                                                 │
//! │ sold             │ - (entered only through sale derivation)          │
//! └──────────────────┴───────────────────────────────────────────────────┘
//! ```
//!
//! ## Sale Transitions
//! ```text
//! pending ─► paid ─► refunded
//!    │
//!    └────► canceled
//! ```
//!
//! All checks are pure lookups. A rejected check never implies a mutation.

use chrono::{DateTime, Duration, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{DeliveryType, OrderStatus, SaleStatus};
use crate::URGENT_READY_MINUTES;

// =============================================================================
// Order
// =============================================================================

impl OrderStatus {
    /// Delivered, canceled and sold orders accept no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Canceled | OrderStatus::Sold
        )
    }
}

/// Statuses reachable from `from` through a status update.
pub fn order_next_statuses(from: OrderStatus, delivery_type: DeliveryType) -> &'static [OrderStatus] {
    use OrderStatus::*;

    match (from, delivery_type) {
        (Received, _) => &[Confirmed, Canceled],
        (Confirmed, _) => &[Preparing, Canceled],
        (Preparing, _) => &[Ready, Canceled],
        (Ready, DeliveryType::Delivery) => &[OutForDelivery, Canceled],
        (Ready, DeliveryType::Pickup) => &[Delivered, Canceled],
        (OutForDelivery, _) => &[Delivered, Canceled],
        (Delivered, _) | (Canceled, _) | (Sold, _) => &[],
    }
}

pub fn order_transition_allowed(
    from: OrderStatus,
    to: OrderStatus,
    delivery_type: DeliveryType,
) -> bool {
    order_next_statuses(from, delivery_type).contains(&to)
}

/// Validates a requested order status change.
///
/// Pickup orders asking for `out_for_delivery` get a dedicated message
/// before the table lookup.
pub fn check_order_transition(
    from: OrderStatus,
    to: OrderStatus,
    delivery_type: DeliveryType,
) -> CoreResult<()> {
    if to == OrderStatus::OutForDelivery && delivery_type == DeliveryType::Pickup {
        return Err(CoreError::InvalidState(
            "pickup orders cannot go out for delivery".to_string(),
        ));
    }

    if !order_transition_allowed(from, to, delivery_type) {
        return Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    Ok(())
}

/// Checks that an order in `status` may be canceled.
pub fn ensure_order_cancelable(status: OrderStatus) -> CoreResult<()> {
    match status {
        OrderStatus::Delivered => Err(CoreError::InvalidState(
            "delivered orders cannot be canceled".to_string(),
        )),
        OrderStatus::Canceled => Err(CoreError::InvalidState(
            "order is already canceled".to_string(),
        )),
        OrderStatus::Sold => Err(CoreError::InvalidState(
            "order was already converted into a sale".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Checks that an order in `status` may be converted into a sale.
pub fn ensure_order_convertible(status: OrderStatus) -> CoreResult<()> {
    if status.is_terminal() {
        return Err(CoreError::InvalidState(format!(
            "orders in status {} cannot be converted into a sale",
            status
        )));
    }
    Ok(())
}

/// Orders that entered `ready` at or before this instant are urgent.
pub fn urgent_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(URGENT_READY_MINUTES)
}

// =============================================================================
// Sale
// =============================================================================

impl SaleStatus {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Canceled | SaleStatus::Refunded)
    }

    /// Whether entering this status hands stock back to inventory.
    pub const fn credits_stock(&self) -> bool {
        self.is_terminal()
    }
}

/// Statuses reachable from `from` through a status update.
pub fn sale_next_statuses(from: SaleStatus) -> &'static [SaleStatus] {
    use SaleStatus::*;

    match from {
        Pending => &[Paid, Canceled],
        Paid => &[Refunded],
        Canceled | Refunded => &[],
    }
}

pub fn check_sale_transition(from: SaleStatus, to: SaleStatus) -> CoreResult<()> {
    if !sale_next_statuses(from).contains(&to) {
        return Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

/// Only pending sales can be canceled.
pub fn ensure_sale_cancelable(status: SaleStatus) -> CoreResult<()> {
    if status != SaleStatus::Pending {
        return Err(CoreError::InvalidState(format!(
            "only pending sales can be canceled (current status: {})",
            status
        )));
    }
    Ok(())
}

/// Only paid sales can be refunded.
pub fn ensure_sale_refundable(status: SaleStatus) -> CoreResult<()> {
    if status != SaleStatus::Paid {
        return Err(CoreError::InvalidState(format!(
            "only paid sales can be refunded (current status: {})",
            status
        )));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_happy_path_delivery() {
        let path = [
            OrderStatus::Received,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(check_order_transition(pair[0], pair[1], DeliveryType::Delivery).is_ok());
        }
    }

    #[test]
    fn test_pickup_skips_out_for_delivery() {
        assert!(
            check_order_transition(OrderStatus::Ready, OrderStatus::Delivered, DeliveryType::Pickup)
                .is_ok()
        );
        let err = check_order_transition(
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
            DeliveryType::Pickup,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));

        // Delivery orders must pass through out_for_delivery.
        assert!(!order_transition_allowed(
            OrderStatus::Ready,
            OrderStatus::Delivered,
            DeliveryType::Delivery
        ));
    }

    #[test]
    fn test_every_pair_outside_table_is_rejected() {
        for delivery_type in DeliveryType::ALL {
            for &from in OrderStatus::ALL {
                for &to in OrderStatus::ALL {
                    let allowed = order_next_statuses(from, *delivery_type).contains(&to);
                    let result = check_order_transition(from, to, *delivery_type);
                    assert_eq!(result.is_ok(), allowed, "{from} -> {to} ({delivery_type})");
                    if let Err(err) = result {
                        assert_eq!(err.kind(), ErrorKind::InvalidState);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sold_is_never_a_status_update_target() {
        for delivery_type in DeliveryType::ALL {
            for &from in OrderStatus::ALL {
                assert!(!order_transition_allowed(from, OrderStatus::Sold, *delivery_type));
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for &status in OrderStatus::ALL {
            if status.is_terminal() {
                assert!(order_next_statuses(status, DeliveryType::Delivery).is_empty());
                assert!(order_next_statuses(status, DeliveryType::Pickup).is_empty());
            }
        }
    }

    #[test]
    fn test_order_cancel_guard() {
        assert!(ensure_order_cancelable(OrderStatus::Received).is_ok());
        assert!(ensure_order_cancelable(OrderStatus::OutForDelivery).is_ok());
        assert!(ensure_order_cancelable(OrderStatus::Delivered).is_err());
        assert!(ensure_order_cancelable(OrderStatus::Canceled).is_err());
        assert!(ensure_order_cancelable(OrderStatus::Sold).is_err());
    }

    #[test]
    fn test_order_conversion_guard() {
        assert!(ensure_order_convertible(OrderStatus::Ready).is_ok());
        assert!(ensure_order_convertible(OrderStatus::Delivered).is_err());
        assert!(ensure_order_convertible(OrderStatus::Canceled).is_err());
        assert!(ensure_order_convertible(OrderStatus::Sold).is_err());
    }

    #[test]
    fn test_sale_transitions() {
        assert!(check_sale_transition(SaleStatus::Pending, SaleStatus::Paid).is_ok());
        assert!(check_sale_transition(SaleStatus::Pending, SaleStatus::Canceled).is_ok());
        assert!(check_sale_transition(SaleStatus::Paid, SaleStatus::Refunded).is_ok());
        assert!(check_sale_transition(SaleStatus::Paid, SaleStatus::Canceled).is_err());
        assert!(check_sale_transition(SaleStatus::Refunded, SaleStatus::Paid).is_err());
        assert!(check_sale_transition(SaleStatus::Pending, SaleStatus::Refunded).is_err());
    }

    #[test]
    fn test_sale_guards() {
        assert!(ensure_sale_cancelable(SaleStatus::Pending).is_ok());
        assert!(ensure_sale_cancelable(SaleStatus::Paid).is_err());
        assert!(ensure_sale_refundable(SaleStatus::Paid).is_ok());
        assert!(ensure_sale_refundable(SaleStatus::Pending).is_err());
        assert!(SaleStatus::Refunded.credits_stock());
        assert!(!SaleStatus::Paid.credits_stock());
    }

    #[test]
    fn test_urgent_cutoff() {
        let now = Utc::now();
        assert_eq!(now - urgent_cutoff(now), Duration::minutes(30));
    }
}
