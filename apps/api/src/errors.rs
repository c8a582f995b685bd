use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::directory::store::DirectoryError;
use crate::scan::ScanError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// No usable identity or role claim; the client must sign in again.
    #[error("Unauthorized")]
    Unauthorized,

    /// Role is known but the requested module or action is not in its capability set.
    #[error("Forbidden")]
    Forbidden,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Integrity fault: {0}")]
    Integrity(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::ValidationFailed(msg) => AppError::Validation(msg),
            e @ DirectoryError::NotFound { .. } => AppError::NotFound(e.to_string()),
            DirectoryError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            DirectoryError::Integrity(msg) => AppError::Integrity(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<ScanError> for AppError {
    fn from(e: ScanError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The directory is temporarily unavailable".to_string(),
                )
            }
            AppError::Integrity(msg) => {
                tracing::error!("Integrity fault: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTEGRITY_ERROR",
                    "A stored record is inconsistent".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
