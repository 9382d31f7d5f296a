//! Product catalog. Every product owns exactly one inventory record, created
//! and deleted together with it.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::user_service::require_user;
use crate::error::{AppError, AppResult};
use store_core::validation::{
    validate_description, validate_id, validate_name, validate_price_cents,
    validate_stock_quantity,
};
use store_core::{Inventory, Product, ValidationError};
use store_db::{Database, NewProduct, ProductChanges};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    /// Owning user.
    pub user_id: i64,
    #[serde(default)]
    pub initial_quantity: i64,
}

impl CreateProduct {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_price_cents(self.price_cents)?;
        validate_id("userId", self.user_id)?;
        validate_stock_quantity(self.initial_quantity, 0)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
}

impl UpdateProduct {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_none() && self.description.is_none() && self.price_cents.is_none() {
            return Err(ValidationError::Required {
                field: "name, description or priceCents".to_string(),
            });
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(price) = self.price_cents {
            validate_price_cents(price)?;
        }
        Ok(())
    }
}

/// A freshly created product with its stock record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithInventory {
    #[serde(flatten)]
    pub product: Product,
    pub inventory: Inventory,
}

#[derive(Debug, Clone)]
pub struct ProductService {
    db: Database,
}

impl ProductService {
    pub fn new(db: Database) -> Self {
        ProductService { db }
    }

    pub async fn create(&self, input: CreateProduct) -> AppResult<ProductWithInventory> {
        input.validate()?;

        if self.db.products().get_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Product '{}' already exists",
                input.name
            )));
        }
        require_user(&self.db, input.user_id, "User").await?;

        let (product, inventory) = self
            .db
            .products()
            .insert_with_inventory(
                &NewProduct {
                    name: input.name,
                    description: input.description,
                    price_cents: input.price_cents,
                    user_id: input.user_id,
                },
                input.initial_quantity,
            )
            .await?;

        info!(
            product_id = product.id,
            quantity = inventory.quantity,
            "Product created"
        );
        Ok(ProductWithInventory { product, inventory })
    }

    pub async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", id))
    }

    pub async fn get_by_name(&self, name: &str) -> AppResult<Product> {
        self.db
            .products()
            .get_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found("Product", name))
    }

    /// Partial update. Renaming to the current name is a validation error;
    /// renaming to another product's name is a conflict.
    pub async fn update(&self, id: i64, input: UpdateProduct) -> AppResult<Product> {
        input.validate()?;
        let current = self.get(id).await?;

        if let Some(name) = &input.name {
            if *name == current.name {
                return Err(ValidationError::Unchanged {
                    field: "name".to_string(),
                }
                .into());
            }
            if self.db.products().get_by_name(name).await?.is_some() {
                return Err(AppError::conflict(format!(
                    "Product '{name}' already exists"
                )));
            }
        }

        let product = self
            .db
            .products()
            .update(
                id,
                &ProductChanges {
                    name: input.name,
                    description: input.description,
                    price_cents: input.price_cents,
                },
            )
            .await?;

        info!(product_id = id, "Product updated");
        Ok(product)
    }

    /// Deletes the product and its inventory record.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.db.products().delete(id).await? {
            return Err(AppError::not_found("Product", id));
        }
        info!(product_id = id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use store_db::{DbConfig, NewUser};

    async fn setup() -> (ProductService, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let owner = db
            .users()
            .insert(&NewUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        (ProductService::new(db), owner.id)
    }

    fn coffee(user_id: i64) -> CreateProduct {
        CreateProduct {
            name: "Coffee".to_string(),
            description: "Ground coffee 500g".to_string(),
            price_cents: 1000,
            user_id,
            initial_quantity: 10,
        }
    }

    #[tokio::test]
    async fn test_create_with_stock() {
        let (products, owner) = setup().await;
        let created = products.create(coffee(owner)).await.unwrap();

        assert_eq!(created.inventory.quantity, 10);
        assert_eq!(created.inventory.product_id, created.product.id);
        assert_eq!(products.get_by_name("Coffee").await.unwrap().id, created.product.id);
    }

    #[tokio::test]
    async fn test_create_rules() {
        let (products, owner) = setup().await;
        products.create(coffee(owner)).await.unwrap();

        let err = products.create(coffee(owner)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        let mut orphan = coffee(owner + 50);
        orphan.name = "Tea".to_string();
        let err = products.create(orphan).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let mut too_pricey = coffee(owner);
        too_pricey.name = "Gold".to_string();
        too_pricey.price_cents = 100_000_001;
        let err = products.create(too_pricey).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_update_name_rules() {
        let (products, owner) = setup().await;
        let first = products.create(coffee(owner)).await.unwrap().product;
        let mut tea = coffee(owner);
        tea.name = "Tea".to_string();
        products.create(tea).await.unwrap();

        let same = UpdateProduct {
            name: Some("Coffee".to_string()),
            ..Default::default()
        };
        assert_eq!(
            products.update(first.id, same).await.unwrap_err().code,
            ErrorCode::ValidationError
        );

        let taken = UpdateProduct {
            name: Some("Tea".to_string()),
            ..Default::default()
        };
        assert_eq!(
            products.update(first.id, taken).await.unwrap_err().code,
            ErrorCode::Conflict
        );

        let repriced = UpdateProduct {
            price_cents: Some(1100),
            ..Default::default()
        };
        assert_eq!(products.update(first.id, repriced).await.unwrap().price_cents, 1100);
    }

    #[tokio::test]
    async fn test_delete() {
        let (products, owner) = setup().await;
        let product = products.create(coffee(owner)).await.unwrap().product;

        products.delete(product.id).await.unwrap();
        assert_eq!(products.get(product.id).await.unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(
            products.delete(product.id).await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }
}
