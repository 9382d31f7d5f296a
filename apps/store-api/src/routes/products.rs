//! Product endpoints

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::extract::{ApiJson, ApiPath};
use crate::response::{ApiResult, Reply};
use crate::services::product_service::{CreateProduct, ProductWithInventory, UpdateProduct};
use crate::state::AppState;
use store_core::Product;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/name/{name}", get(get_by_name))
        .route("/api/products/{id}", get(get_one).put(update).delete(remove))
}

/// POST /api/products
///
/// Also creates the product's inventory record with `initialQuantity`.
async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateProduct>,
) -> ApiResult<ProductWithInventory> {
    let created = state.products.create(input).await?;
    Ok(Reply::created("Product created successfully", created))
}

async fn list(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    Ok(Reply::ok("Products retrieved", state.products.list().await?))
}

async fn get_one(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Product> {
    Ok(Reply::ok("Product retrieved", state.products.get(id).await?))
}

async fn get_by_name(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Product> {
    Ok(Reply::ok("Product retrieved", state.products.get_by_name(&name).await?))
}

async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateProduct>,
) -> ApiResult<Product> {
    let product = state.products.update(id, input).await?;
    Ok(Reply::ok("Product updated successfully", product))
}

/// DELETE /api/products/{id}
///
/// Removes the inventory record with it.
async fn remove(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.products.delete(id).await?;
    Ok(Reply::message("Product deleted successfully"))
}
