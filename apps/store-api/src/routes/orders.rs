//! Order endpoints: creation, lifecycle changes and reports.
//!
//! Static segments (`urgent`, `statistics`, ...) win over `{id}` captures,
//! so `/api/orders/urgent` never reaches the single-order handler.

use axum::extract::State;
use axum::routing::{get, patch};
use axum::Router;

use super::PeriodQuery;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{ApiResult, Reply};
use crate::services::order_service::{CreateOrder, UpdateEstimatedTime, UpdateOrderStatus};
use crate::services::ReasonRequest;
use crate::state::AppState;
use store_core::stats::{OrderStatistics, StatusSummary};
use store_core::{DeliveryType, Order, OrderStatus};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/urgent", get(urgent))
        .route("/api/orders/in-preparation", get(in_preparation))
        .route("/api/orders/period", get(by_period))
        .route("/api/orders/statistics", get(statistics))
        .route("/api/orders/statistics/by-status", get(status_summary))
        .route("/api/orders/client/{client_id}", get(by_client))
        .route("/api/orders/seller/{seller_id}", get(by_seller))
        .route("/api/orders/status/{status}", get(by_status))
        .route("/api/orders/delivery-type/{delivery_type}", get(by_delivery_type))
        .route("/api/orders/product/{product_id}", get(by_product))
        .route("/api/orders/{id}", get(get_one))
        .route("/api/orders/{id}/status", patch(update_status))
        .route("/api/orders/{id}/estimated-time", patch(update_estimated_time))
        .route("/api/orders/{id}/cancel", patch(cancel))
}

// =============================================================================
// Commands
// =============================================================================

/// POST /api/orders
async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<CreateOrder>) -> ApiResult<Order> {
    let order = state.orders.create(input).await?;
    Ok(Reply::created("Order created successfully", order))
}

/// PATCH /api/orders/{id}/status
async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<UpdateOrderStatus>,
) -> ApiResult<Order> {
    let order = state.orders.update_status(&id, input.status).await?;
    Ok(Reply::ok("Order status updated successfully", order))
}

/// PATCH /api/orders/{id}/estimated-time
async fn update_estimated_time(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<UpdateEstimatedTime>,
) -> ApiResult<Order> {
    let order = state
        .orders
        .update_estimated_time(&id, input.estimated_minutes)
        .await?;
    Ok(Reply::ok("Estimated time updated successfully", order))
}

/// PATCH /api/orders/{id}/cancel
async fn cancel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<ReasonRequest>,
) -> ApiResult<Order> {
    let order = state.orders.cancel(&id, &input.reason).await?;
    Ok(Reply::ok("Order canceled successfully", order))
}

// =============================================================================
// Queries
// =============================================================================

async fn list(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    Ok(Reply::ok("Orders retrieved", state.orders.list_all().await?))
}

async fn get_one(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<Order> {
    Ok(Reply::ok("Order retrieved", state.orders.get(&id).await?))
}

async fn by_client(
    State(state): State<AppState>,
    ApiPath(client_id): ApiPath<i64>,
) -> ApiResult<Vec<Order>> {
    Ok(Reply::ok("Orders retrieved", state.orders.by_client(client_id).await?))
}

async fn by_seller(
    State(state): State<AppState>,
    ApiPath(seller_id): ApiPath<i64>,
) -> ApiResult<Vec<Order>> {
    Ok(Reply::ok("Orders retrieved", state.orders.by_seller(seller_id).await?))
}

async fn by_status(
    State(state): State<AppState>,
    ApiPath(status): ApiPath<OrderStatus>,
) -> ApiResult<Vec<Order>> {
    Ok(Reply::ok("Orders retrieved", state.orders.by_status(status).await?))
}

async fn by_delivery_type(
    State(state): State<AppState>,
    ApiPath(delivery_type): ApiPath<DeliveryType>,
) -> ApiResult<Vec<Order>> {
    let orders = state.orders.by_delivery_type(delivery_type).await?;
    Ok(Reply::ok("Orders retrieved", orders))
}

async fn by_product(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i64>,
) -> ApiResult<Vec<Order>> {
    Ok(Reply::ok("Orders retrieved", state.orders.by_product(product_id).await?))
}

/// GET /api/orders/period?start=&end=
async fn by_period(
    State(state): State<AppState>,
    ApiQuery(period): ApiQuery<PeriodQuery>,
) -> ApiResult<Vec<Order>> {
    let orders = state.orders.by_date_range(period.start, period.end).await?;
    Ok(Reply::ok("Orders retrieved", orders))
}

/// GET /api/orders/urgent
///
/// Orders sitting in `ready` for more than 30 minutes, longest wait first.
async fn urgent(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    Ok(Reply::ok("Urgent orders retrieved", state.orders.urgent().await?))
}

async fn in_preparation(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    let orders = state.orders.in_preparation().await?;
    Ok(Reply::ok("Orders in preparation retrieved", orders))
}

async fn statistics(
    State(state): State<AppState>,
    ApiQuery(period): ApiQuery<PeriodQuery>,
) -> ApiResult<OrderStatistics> {
    let stats = state.orders.statistics(period.start, period.end).await?;
    Ok(Reply::ok("Order statistics retrieved", stats))
}

async fn status_summary(
    State(state): State<AppState>,
    ApiQuery(period): ApiQuery<PeriodQuery>,
) -> ApiResult<Vec<StatusSummary>> {
    let summary = state.orders.status_summary(period.start, period.end).await?;
    Ok(Reply::ok("Order status summary retrieved", summary))
}
