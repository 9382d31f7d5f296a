//! Health check endpoint

use axum::extract::State;
use serde::Serialize;

use crate::response::{ApiResult, Reply};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub service: &'static str,
    pub version: &'static str,
    pub relational_store: bool,
    pub document_store: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<HealthStatus> {
    let status = HealthStatus {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        relational_store: state.db.health_check().await,
        document_store: state.docs.health_check().await,
    };

    let message = if status.relational_store && status.document_store {
        "Service healthy"
    } else {
        "Service degraded"
    };
    Ok(Reply::ok(message, status))
}
