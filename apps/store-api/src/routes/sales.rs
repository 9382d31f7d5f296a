//! Sale endpoints

use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::Router;

use super::PeriodQuery;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{ApiResult, Reply};
use crate::services::sale_service::{CreateSale, CreateSaleFromOrder, UpdateSaleStatus};
use crate::services::ReasonRequest;
use crate::state::AppState;
use store_core::stats::SaleStatistics;
use store_core::{Sale, SaleStatus};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/sales", get(list).post(create))
        .route("/api/sales/from-order", post(create_from_order))
        .route("/api/sales/period", get(by_period))
        .route("/api/sales/statistics", get(statistics))
        .route("/api/sales/client/{client_id}", get(by_client))
        .route("/api/sales/seller/{seller_id}", get(by_seller))
        .route("/api/sales/order/{order_id}", get(by_order))
        .route("/api/sales/status/{status}", get(by_status))
        .route("/api/sales/product/{product_id}", get(by_product))
        .route("/api/sales/{id}", get(get_one))
        .route("/api/sales/{id}/status", patch(update_status))
        .route("/api/sales/{id}/cancel", patch(cancel))
        .route("/api/sales/{id}/refund", patch(refund))
}

/// POST /api/sales
async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<CreateSale>) -> ApiResult<Sale> {
    let sale = state.sales.create(input).await?;
    Ok(Reply::created("Sale created successfully", sale))
}

/// POST /api/sales/from-order
async fn create_from_order(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateSaleFromOrder>,
) -> ApiResult<Sale> {
    let sale = state.sales.create_from_order(&input.order_id).await?;
    Ok(Reply::created("Sale created from order successfully", sale))
}

async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<UpdateSaleStatus>,
) -> ApiResult<Sale> {
    let sale = state.sales.update_status(&id, input.status).await?;
    Ok(Reply::ok("Sale status updated successfully", sale))
}

async fn cancel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<ReasonRequest>,
) -> ApiResult<Sale> {
    let sale = state.sales.cancel(&id, &input.reason).await?;
    Ok(Reply::ok("Sale canceled successfully", sale))
}

async fn refund(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<ReasonRequest>,
) -> ApiResult<Sale> {
    let sale = state.sales.refund(&id, &input.reason).await?;
    Ok(Reply::ok("Sale refunded successfully", sale))
}

async fn list(State(state): State<AppState>) -> ApiResult<Vec<Sale>> {
    Ok(Reply::ok("Sales retrieved", state.sales.list_all().await?))
}

async fn get_one(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<Sale> {
    Ok(Reply::ok("Sale retrieved", state.sales.get(&id).await?))
}

async fn by_client(
    State(state): State<AppState>,
    ApiPath(client_id): ApiPath<i64>,
) -> ApiResult<Vec<Sale>> {
    Ok(Reply::ok("Sales retrieved", state.sales.by_client(client_id).await?))
}

async fn by_seller(
    State(state): State<AppState>,
    ApiPath(seller_id): ApiPath<i64>,
) -> ApiResult<Vec<Sale>> {
    Ok(Reply::ok("Sales retrieved", state.sales.by_seller(seller_id).await?))
}

async fn by_order(
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<String>,
) -> ApiResult<Sale> {
    Ok(Reply::ok("Sale retrieved", state.sales.by_order(&order_id).await?))
}

async fn by_status(
    State(state): State<AppState>,
    ApiPath(status): ApiPath<SaleStatus>,
) -> ApiResult<Vec<Sale>> {
    Ok(Reply::ok("Sales retrieved", state.sales.by_status(status).await?))
}

async fn by_product(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i64>,
) -> ApiResult<Vec<Sale>> {
    Ok(Reply::ok("Sales retrieved", state.sales.by_product(product_id).await?))
}

/// GET /api/sales/period?start=&end=
async fn by_period(
    State(state): State<AppState>,
    ApiQuery(period): ApiQuery<PeriodQuery>,
) -> ApiResult<Vec<Sale>> {
    let sales = state.sales.by_date_range(period.start, period.end).await?;
    Ok(Reply::ok("Sales retrieved", sales))
}

async fn statistics(
    State(state): State<AppState>,
    ApiQuery(period): ApiQuery<PeriodQuery>,
) -> ApiResult<SaleStatistics> {
    let stats = state.sales.statistics(period.start, period.end).await?;
    Ok(Reply::ok("Sale statistics retrieved", stats))
}
