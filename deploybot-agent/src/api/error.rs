//! API Error Handling
//!
//! Unified error type and conversion for API responses. Every error body is
//! an `ApiResponse` envelope carrying a non-zero code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deploybot_core::dto::api::ApiResponse;

use crate::runtime::RuntimeError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Runtime(RuntimeError),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::client_error(msg),
            ),
            ApiError::Runtime(err) => {
                tracing::error!("Runtime error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::server_error(err.to_string()),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::server_error(msg),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RuntimeError> for ApiError {
    fn from(err: RuntimeError) -> Self {
        ApiError::Runtime(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
