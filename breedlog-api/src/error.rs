//! HTTP error type for breedlog-api
//!
//! Every failure leaves the service as `{"error": {"code", "message"}}` with
//! the status mapped from the variant.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Validation failure (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer credential (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Absent, or owned by someone else (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Unique constraint violated (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Image fetch, classifier or datastore failure (500, message echoed)
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<breedlog_common::Error> for ApiError {
    fn from(err: breedlog_common::Error) -> Self {
        use breedlog_common::Error as Common;
        match err {
            Common::InvalidInput(msg) => ApiError::BadRequest(msg),
            Common::NotFound(msg) => ApiError::NotFound(msg),
            Common::Conflict(msg) => ApiError::Conflict(msg),
            Common::Database(e) => ApiError::Upstream(format!("Database error: {}", e)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Upstream(msg) => {
                error!("Upstream failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR", msg)
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::Other(ref err) => {
                error!("Unhandled error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
