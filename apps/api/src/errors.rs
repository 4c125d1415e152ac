use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application-level error type.
/// Every failure in the core is recoverable and reportable; none is fatal.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already applied to job {job_id}")]
    DuplicateApplication { job_id: Uuid },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

impl From<crate::remote::RemoteError> for AppError {
    fn from(e: crate::remote::RemoteError) -> Self {
        AppError::Remote(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NoActiveSession => (
                StatusCode::UNAUTHORIZED,
                "NO_ACTIVE_SESSION",
                "Log in to continue".to_string(),
            ),
            AppError::JobNotFound(id) => (
                StatusCode::NOT_FOUND,
                "JOB_NOT_FOUND",
                format!("Job {id} not found"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::DuplicateApplication { job_id } => (
                StatusCode::CONFLICT,
                "DUPLICATE_APPLICATION",
                format!("You have already applied to job {job_id}"),
            ),
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
            AppError::Storage(msg) => {
                tracing::error!("Session storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "The session could not be saved".to_string(),
                )
            }
            AppError::Remote(msg) => {
                tracing::error!("Remote service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "REMOTE_ERROR",
                    "The marketplace service is unavailable".to_string(),
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
