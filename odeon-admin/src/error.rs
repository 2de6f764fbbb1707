//! Error types for odeon-admin

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::registrar::RegisterError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Admin authorization failure (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Book registration failure (mapped per variant)
    #[error(transparent)]
    Register(#[from] RegisterError),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None),
            ApiError::Register(err) => return err.into_response(),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
                None,
            ),
        };

        error_response(status, error_code, &message, details)
    }
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            RegisterError::DuplicateBook => (StatusCode::BAD_REQUEST, "DUPLICATE_BOOK", None),
            RegisterError::MetadataNotFound => (StatusCode::NOT_FOUND, "METADATA_NOT_FOUND", None),
            RegisterError::ImageDownloadFailed => {
                (StatusCode::BAD_REQUEST, "IMAGE_DOWNLOAD_FAILED", None)
            }
            RegisterError::MissingContent => (StatusCode::BAD_REQUEST, "MISSING_CONTENT", None),
            RegisterError::ValidationFailed { errors } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                Some(json!(errors)),
            ),
            RegisterError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
            }
        };

        let message = self.to_string();
        error_response(status, error_code, &message, details)
    }
}

fn error_response(
    status: StatusCode,
    error_code: &str,
    message: &str,
    details: Option<serde_json::Value>,
) -> Response {
    let mut error = json!({
        "code": error_code,
        "message": message,
    });
    if let Some(details) = details {
        error["details"] = details;
    }

    (status, Json(json!({ "error": error }))).into_response()
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
