//! HTTP API surface

pub mod response;
pub mod routes;

pub use response::{ApiResponse, ApiResult, AppError, ErrorResponse};
pub use routes::{router, AppState};
