//! Model Module - Risk Model Adapter
//!
//! Wraps a static trained regressor and its ordered column schema as one
//! immutable unit, loaded once per process and shared read-only.
//!
//! # Components
//! - `artifact.rs`: `Regressor` trait, ONNX implementation, input row building
//! - `store.rs`: where artifacts come from (local directory, remote store)
//! - `inference.rs`: `RiskModel` service with single-initializer loading

pub mod artifact;
pub mod store;
pub mod inference;

use thiserror::Error;

pub use artifact::{build_input_row, ModelArtifact, OnnxRegressor, Regressor};
pub use inference::{ModelStatus, Prediction, RiskModel};
pub use store::{open_store, LocalModelStore, ModelStore, RemoteModelStore};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("model artifact not found: {0}")]
    NotFound(String),

    #[error("model artifact corrupt: {0}")]
    Corrupt(String),

    #[error("invalid column schema: {0}")]
    Schema(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },

    #[error("model fetch failed: {0}")]
    Fetch(String),

    #[error("inference error: {0}")]
    Inference(String),
}
