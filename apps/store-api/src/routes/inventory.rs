//! Inventory endpoints

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::extract::{ApiJson, ApiPath};
use crate::response::{ApiResult, Reply};
use crate::services::inventory_service::{CreateInventory, UpdateInventory};
use crate::state::AppState;
use store_core::Inventory;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/inventory", get(list).post(create))
        .route("/api/inventory/product/{product_id}", get(get_by_product))
        .route("/api/inventory/{id}", get(get_one).put(update).delete(remove))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateInventory>,
) -> ApiResult<Inventory> {
    let record = state.inventory.create(input).await?;
    Ok(Reply::created("Inventory created successfully", record))
}

async fn list(State(state): State<AppState>) -> ApiResult<Vec<Inventory>> {
    Ok(Reply::ok("Inventory retrieved", state.inventory.list().await?))
}

async fn get_one(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Inventory> {
    Ok(Reply::ok("Inventory retrieved", state.inventory.get(id).await?))
}

async fn get_by_product(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i64>,
) -> ApiResult<Inventory> {
    let record = state.inventory.get_by_product(product_id).await?;
    Ok(Reply::ok("Inventory retrieved", record))
}

/// PUT /api/inventory/{id}
///
/// Overwrites the quantity; stock movements from orders and sales do not go
/// through here.
async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateInventory>,
) -> ApiResult<Inventory> {
    let record = state.inventory.update(id, input).await?;
    Ok(Reply::ok("Inventory updated successfully", record))
}

async fn remove(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.inventory.delete(id).await?;
    Ok(Reply::message("Inventory deleted successfully"))
}
