//! Response envelope shared by every endpoint.
//!
//! ```json
//! { "status": "success", "message": "Order created", "data": { ... } }
//! { "status": "error",   "message": "Order not found: 42" }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

/// JSON body of every response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: Outcome,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        ApiResponse {
            status: Outcome::Success,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse {
            status: Outcome::Error,
            message: message.into(),
            data: None,
        }
    }
}

/// A successful reply: status code plus envelope.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    body: ApiResponse<T>,
}

impl<T: Serialize> Reply<T> {
    /// 200 with data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Reply {
            status: StatusCode::OK,
            body: ApiResponse::success(message, Some(data)),
        }
    }

    /// 201 with the created resource.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Reply {
            status: StatusCode::CREATED,
            body: ApiResponse::success(message, Some(data)),
        }
    }
}

impl Reply<()> {
    /// 200 without data.
    pub fn message(message: impl Into<String>) -> Self {
        Reply {
            status: StatusCode::OK,
            body: ApiResponse::success(message, None),
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Handler result.
pub type ApiResult<T> = Result<Reply<T>, AppError>;
