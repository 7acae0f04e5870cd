//! Error handling
//!
//! Only two failures ever reach a caller of the engine: a target that cannot
//! be scanned and a model that cannot be loaded. Per-source failures are
//! recovered inside the orchestrator and only show up as degraded sources.

use thiserror::Error;

use crate::logic::model::ModelError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before any connector is invoked
    #[error("malformed target: {0}")]
    MalformedTarget(String),

    /// Trained model or column schema missing, corrupt or unreachable
    #[error("risk model unavailable: {0}")]
    ModelUnavailable(ModelError),

    /// Model loaded but inference failed
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn is_malformed_target(&self) -> bool {
        matches!(self, EngineError::MalformedTarget(_))
    }

    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, EngineError::ModelUnavailable(_))
    }
}

impl From<ModelError> for EngineError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Inference(msg) => EngineError::Inference(msg),
            other => EngineError::ModelUnavailable(other),
        }
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::Internal(format!("scoring task failed: {}", err))
    }
}
