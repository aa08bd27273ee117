//! API response types
//!
//! Standard response structures shared by every handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::commands::{CreateRecordError, DispatchError};
use crate::extract::ExtractError;
use crate::notion::NotionError;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Application error type that can be converted to HTTP responses
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// The Notion backend or a metadata source rejected or failed a call.
    Upstream(String),
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg)
            },
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            },
        };

        let error_response = ErrorResponse::new(code, message);
        (status, Json(error_response)).into_response()
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            // Both are deployment faults: missing wiring or a broken
            // extractor, never the caller.
            DispatchError::UnregisteredKind(e) => AppError::InternalError(e.to_string()),
            DispatchError::MalformedRecord(e) => AppError::InternalError(e.to_string()),
            DispatchError::Extract(ExtractError::Http(e)) => AppError::Upstream(e.to_string()),
            DispatchError::Extract(ExtractError::Parse(msg)) => AppError::Upstream(msg),
            DispatchError::Create(CreateRecordError::Store(e)) => map_notion(e),
            DispatchError::Create(CreateRecordError::Resolve(e)) => match e {
                crate::commands::ResolveError::Store(e) => map_notion(e),
                other => AppError::InternalError(other.to_string()),
            },
            DispatchError::Create(other) => AppError::InternalError(other.to_string()),
        }
    }
}

fn map_notion(err: NotionError) -> AppError {
    AppError::Upstream(err.to_string())
}

/// Alias for Result with AppError
pub type ApiResult<T> = Result<T, AppError>;
