//! Shared setup for service tests: two users and three stocked products in
//! fresh in-memory stores.

use sqlx::SqlitePool;
use store_core::{Product, User};
use store_db::{Database, DbConfig, DocumentStore, NewProduct, NewUser};

use super::stock::StockKeeper;

pub(crate) struct Fixture {
    pub db: Database,
    pub docs: DocumentStore,
    pub stock: StockKeeper,
    pub client: User,
    pub seller: User,
    /// 10.00, 10 in stock.
    pub coffee: Product,
    /// 5.00, 5 in stock.
    pub tea: Product,
    /// 7.00, out of stock.
    pub cocoa: Product,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let docs = DocumentStore::new(DbConfig::in_memory()).await.unwrap();

        let client = user(&db, "Carla Client", "carla@example.com").await;
        let seller = user(&db, "Sergio Seller", "sergio@example.com").await;

        let coffee = product(&db, "Coffee", 1000, 10, seller.id).await;
        let tea = product(&db, "Tea", 500, 5, seller.id).await;
        let cocoa = product(&db, "Cocoa", 700, 0, seller.id).await;

        Fixture {
            stock: StockKeeper::new(db.clone()),
            db,
            docs,
            client,
            seller,
            coffee,
            tea,
            cocoa,
        }
    }

    pub async fn stock_of(&self, product_id: i64) -> i64 {
        self.db
            .inventory()
            .get_by_product(product_id)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }
}

/// Installs a trigger that aborts every UPDATE on `table`, so the write
/// that follows a successful insert fails.
pub(crate) async fn reject_updates(pool: &SqlitePool, table: &str) {
    let sql = format!(
        "CREATE TRIGGER reject_{table}_updates BEFORE UPDATE ON {table} \
         BEGIN SELECT RAISE(ABORT, '{table} is read-only'); END"
    );
    sqlx::query(&sql).execute(pool).await.unwrap();
}

async fn user(db: &Database, name: &str, email: &str) -> User {
    db.users()
        .insert(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap()
}

async fn product(db: &Database, name: &str, price_cents: i64, quantity: i64, user_id: i64) -> Product {
    db.products()
        .insert_with_inventory(
            &NewProduct {
                name: name.to_string(),
                description: format!("{name} for tests"),
                price_cents,
                user_id,
            },
            quantity,
        )
        .await
        .unwrap()
        .0
}
