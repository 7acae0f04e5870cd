//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use riskscan_core::EngineError;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed validation
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Target rejected by the classifier
    #[error("malformed target: {0}")]
    MalformedTarget(String),

    /// No model, no score
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MalformedTarget(msg) => (StatusCode::BAD_REQUEST, format!("Malformed target: {}", msg)),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Risk model unavailable".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MalformedTarget(msg) => AppError::MalformedTarget(msg),
            EngineError::ModelUnavailable(e) => AppError::ModelUnavailable(e.to_string()),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
