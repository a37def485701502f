//! API error handling utilities.

use crate::models::EtagError;
use crate::services::ServiceError;
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

/// API error response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    /// Machine-readable error code
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_argument", message)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match &e {
            StorageError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, "not_found", e.to_string()),
            StorageError::VersionConflict { .. } => {
                warn!("Rejected stale write: {}", e);
                Self::new(StatusCode::CONFLICT, "version_conflict", e.to_string())
            }
            StorageError::ConnectionError(_) | StorageError::Other(_) => {
                error!("Storage failure: {}", e);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal storage error",
                )
            }
        }
    }
}

impl From<EtagError> for ApiError {
    fn from(e: EtagError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Storage(e) => e.into(),
            ServiceError::InvalidEtag(e) => e.into(),
            ServiceError::Validation(msg) => {
                warn!("Rejected request: {}", msg);
                Self::bad_request(msg)
            }
            ServiceError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, "forbidden", msg),
            ServiceError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "conflict", msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "code": self.code,
            "status": self.status.as_u16(),
        });

        (self.status, axum::Json(body)).into_response()
    }
}

/// Result type of route handlers
pub type ApiResult<T> = Result<T, ApiError>;
