//! Business services behind the HTTP handlers.
//!
//! Each service owns cheap clones of the store handles it needs. Order and
//! sale services share one [`StockKeeper`] so their stock checks and
//! adjustments are serialized.

pub mod inventory_service;
pub mod order_service;
pub mod product_service;
pub mod sale_service;
pub mod stock;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use inventory_service::InventoryService;
pub use order_service::OrderService;
pub use product_service::ProductService;
pub use sale_service::SaleService;
pub use stock::StockKeeper;
pub use user_service::UserService;

use serde::Deserialize;

/// Body of the cancel and refund endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: String,
}
