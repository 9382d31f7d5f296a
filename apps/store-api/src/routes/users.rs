//! User endpoints

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::extract::{ApiJson, ApiPath};
use crate::response::{ApiResult, Reply};
use crate::services::user_service::{CreateUser, UpdateUser};
use crate::state::AppState;
use store_core::User;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list).post(create))
        .route("/api/users/email/{email}", get(get_by_email))
        .route("/api/users/{id}", get(get_one).put(update).delete(remove))
}

/// POST /api/users
async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<CreateUser>) -> ApiResult<User> {
    let user = state.users.create(input).await?;
    Ok(Reply::created("User created successfully", user))
}

/// GET /api/users
async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(Reply::ok("Users retrieved", state.users.list().await?))
}

/// GET /api/users/{id}
async fn get_one(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<User> {
    Ok(Reply::ok("User retrieved", state.users.get(id).await?))
}

/// GET /api/users/email/{email}
async fn get_by_email(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> ApiResult<User> {
    Ok(Reply::ok("User retrieved", state.users.get_by_email(&email).await?))
}

/// PUT /api/users/{id}
async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateUser>,
) -> ApiResult<User> {
    Ok(Reply::ok("User updated successfully", state.users.update(id, input).await?))
}

/// DELETE /api/users/{id}
async fn remove(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.users.delete(id).await?;
    Ok(Reply::message("User deleted successfully"))
}
