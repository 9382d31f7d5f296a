//! Shared application state handed to every handler.

use store_db::{Database, DocumentStore};

use crate::services::{
    InventoryService, OrderService, ProductService, SaleService, StockKeeper, UserService,
};

/// Store handles plus the services built on them. Cloning is cheap: the
/// pools are reference counted and the stock guard is shared.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub docs: DocumentStore,
    pub users: UserService,
    pub products: ProductService,
    pub inventory: InventoryService,
    pub orders: OrderService,
    pub sales: SaleService,
}

impl AppState {
    pub fn new(db: Database, docs: DocumentStore) -> Self {
        let stock = StockKeeper::new(db.clone());

        AppState {
            users: UserService::new(db.clone()),
            products: ProductService::new(db.clone()),
            inventory: InventoryService::new(db.clone()),
            orders: OrderService::new(db.clone(), docs.clone(), stock.clone()),
            sales: SaleService::new(db.clone(), docs.clone(), stock),
            db,
            docs,
        }
    }
}
