//! Model Artifact - ONNX Runtime Integration
//!
//! A loaded regressor plus the ordered columns it was trained on. Input rows
//! are built against those columns, not against the feature layout, so a
//! model trained on a subset or with one-hot categoricals still lines up.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::ModelError;
use crate::logic::features::FeatureVector;

/// Categorical signals that may appear as `<name>_<value>` indicator columns
const INDICATOR_PREFIXES: &[&str] = &["ssl_grade", "social_presence"];

// ============================================================================
// REGRESSOR TRAIT
// ============================================================================

/// Anything that maps one input row to a continuous score
pub trait Regressor: Send + Sync {
    fn predict_row(&self, row: &[f32]) -> Result<f32, ModelError>;

    /// Short label for status output
    fn describe(&self) -> String {
        "regressor".to_string()
    }
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// ONNX regressor; the session needs exclusive access to run
pub struct OnnxRegressor {
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxRegressor {
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, ModelError> {
        log::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ModelError::Corrupt(format!("session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Corrupt(format!("optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ModelError::Corrupt(format!("failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::Corrupt("model defines no outputs".to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl Regressor for OnnxRegressor {
    fn predict_row(&self, row: &[f32]) -> Result<f32, ModelError> {
        let input = Array2::<f32>::from_shape_vec((1, row.len()), row.to_vec())
            .map_err(|e| ModelError::Inference(format!("array error: {}", e)))?;
        let input_tensor = Value::from_array(input)
            .map_err(|e| ModelError::Inference(format!("tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(format!("inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ModelError::Inference("no output".to_string()))?;
        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("extract error: {}", e)))?;

        let raw = output_tensor.1.first().copied();
        raw.ok_or_else(|| ModelError::Inference("empty output tensor".to_string()))
    }

    fn describe(&self) -> String {
        "onnx".to_string()
    }
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// Regressor + column schema, immutable once built
#[derive(Clone)]
pub struct ModelArtifact {
    regressor: Arc<dyn Regressor>,
    columns: Vec<String>,
    source: String,
    loaded_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Rejects empty or duplicated column lists
    pub fn new(
        regressor: Arc<dyn Regressor>,
        columns: Vec<String>,
        source: impl Into<String>,
    ) -> Result<Self, ModelError> {
        validate_columns(&columns)?;
        Ok(Self {
            regressor,
            columns,
            source: source.into(),
            loaded_at: Utc::now(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn kind(&self) -> String {
        self.regressor.describe()
    }

    /// Raw continuous prediction for one feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<f32, ModelError> {
        if !features.is_compatible() {
            return Err(ModelError::Inference(format!(
                "feature layout mismatch (version {}, hash {:08x})",
                features.version, features.layout_hash
            )));
        }
        let row = build_input_row(&self.columns, features);
        let raw = self.regressor.predict_row(&row)?;
        if !raw.is_finite() {
            return Err(ModelError::Inference(format!("non-finite prediction: {}", raw)));
        }
        Ok(raw)
    }
}

impl std::fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("kind", &self.regressor.describe())
            .field("columns", &self.columns.len())
            .field("source", &self.source)
            .finish()
    }
}

pub(crate) fn validate_columns(columns: &[String]) -> Result<(), ModelError> {
    if columns.is_empty() {
        return Err(ModelError::Schema("column list is empty".to_string()));
    }
    let mut seen = std::collections::HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(ModelError::Schema(format!("duplicate column: {}", column)));
        }
    }
    Ok(())
}

// ============================================================================
// INPUT ROW
// ============================================================================

/// One value per schema column, in schema order.
///
/// - a feature name takes the feature value
/// - `ssl_grade_<g>` / `social_presence_<p>` is 1.0 iff the categorical equals
///   `<g>` / `<p>` (case-insensitive)
/// - anything else is 0.0
pub fn build_input_row(columns: &[String], features: &FeatureVector) -> Vec<f32> {
    columns
        .iter()
        .map(|column| {
            if let Some(value) = features.get_by_name(column) {
                return value;
            }
            indicator_value(column, features).unwrap_or(0.0)
        })
        .collect()
}

fn indicator_value(column: &str, features: &FeatureVector) -> Option<f32> {
    INDICATOR_PREFIXES.iter().find_map(|prefix| {
        let wanted = column.strip_prefix(prefix)?.strip_prefix('_')?;
        let actual = features.categoricals.get(prefix)?;
        Some(if actual.eq_ignore_ascii_case(wanted) { 1.0 } else { 0.0 })
    })
}
