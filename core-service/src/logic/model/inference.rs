//! Risk Model Service
//!
//! Owns the model store and the loaded artifact. The artifact is loaded on
//! first use behind a single-initializer cell: concurrent first callers wait
//! on one load instead of each fetching a copy. A failed load leaves the cell
//! empty so a later call retries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::artifact::ModelArtifact;
use super::store::ModelStore;
use super::ModelError;
use crate::logic::features::{FeatureVector, LayoutInfo};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model stage output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Continuous regressor output
    pub raw: f64,
    /// `raw` rounded to the nearest integer
    pub base_score: i64,
}

impl Prediction {
    pub fn from_raw(raw: f64) -> Self {
        Self {
            raw,
            base_score: raw.round() as i64,
        }
    }
}

/// Model status for API / CLI output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub location: String,
    pub kind: Option<String>,
    pub columns: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub inference_count: u64,
    pub avg_latency_ms: f32,
    pub last_error: Option<String>,
    pub layout: LayoutInfo,
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct RiskModel {
    store: Box<dyn ModelStore>,
    artifact: OnceCell<ModelArtifact>,
    last_error: RwLock<Option<String>>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl RiskModel {
    pub fn new(store: Box<dyn ModelStore>) -> Self {
        Self {
            store,
            artifact: OnceCell::new(),
            last_error: RwLock::new(None),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Service around an already-built artifact
    pub fn preloaded(artifact: ModelArtifact) -> Self {
        let model = Self::new(Box::new(PreloadedStore(artifact.clone())));
        // Fresh cell, cannot already be set
        let _ = model.artifact.set(artifact);
        model
    }

    /// Loaded artifact, loading it on first call
    pub fn artifact(&self) -> Result<&ModelArtifact, ModelError> {
        let result = self.artifact.get_or_try_init(|| self.store.load());
        match &result {
            Ok(_) => *self.last_error.write() = None,
            Err(e) => {
                log::error!("Risk model unavailable: {}", e);
                *self.last_error.write() = Some(e.to_string());
            }
        }
        result
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.get().is_some()
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let artifact = self.artifact()?;

        let start = Instant::now();
        let raw = artifact.predict(features)?;
        let elapsed = start.elapsed().as_micros() as u64;

        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        let prediction = Prediction::from_raw(raw as f64);
        log::debug!(
            "Model prediction: raw={:.3} base_score={} ({}us)",
            prediction.raw,
            prediction.base_score,
            elapsed
        );
        Ok(prediction)
    }

    /// Snapshot of load state and counters. Never triggers a load.
    pub fn status(&self) -> ModelStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        };

        let artifact = self.artifact.get();
        ModelStatus {
            loaded: artifact.is_some(),
            location: self.store.location(),
            kind: artifact.map(|a| a.kind()),
            columns: artifact.map(|a| a.columns().len()).unwrap_or(0),
            loaded_at: artifact.map(|a| a.loaded_at()),
            inference_count: count,
            avg_latency_ms: avg,
            last_error: self.last_error.read().clone(),
            layout: LayoutInfo::current(),
        }
    }
}

struct PreloadedStore(ModelArtifact);

impl ModelStore for PreloadedStore {
    fn load(&self) -> Result<ModelArtifact, ModelError> {
        Ok(self.0.clone())
    }

    fn location(&self) -> String {
        self.0.source().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::Regressor;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct ConstRegressor(f32);

    impl Regressor for ConstRegressor {
        fn predict_row(&self, _row: &[f32]) -> Result<f32, ModelError> {
            Ok(self.0)
        }
    }

    struct CountingStore {
        loads: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ModelStore for CountingStore {
        fn load(&self) -> Result<ModelArtifact, ModelError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            if self.fail {
                return Err(ModelError::NotFound("risk_model.onnx".to_string()));
            }
            ModelArtifact::new(
                Arc::new(ConstRegressor(49.6)),
                vec!["ip_abuse_score".to_string()],
                "memory",
            )
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let model = RiskModel::new(Box::new(CountingStore {
            loads: loads.clone(),
            fail: false,
        }));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    model.predict(&FeatureVector::new()).unwrap();
                });
            }
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(model.status().inference_count, 8);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let loads = Arc::new(AtomicUsize::new(0));
        let model = RiskModel::new(Box::new(CountingStore {
            loads: loads.clone(),
            fail: true,
        }));

        assert!(matches!(model.predict(&FeatureVector::new()), Err(ModelError::NotFound(_))));
        assert!(model.predict(&FeatureVector::new()).is_err());
        assert_eq!(loads.load(Ordering::SeqCst), 2);

        let status = model.status();
        assert!(!status.loaded);
        assert!(status.last_error.is_some());
    }

    #[test]
    fn test_base_score_is_rounded_raw() {
        let artifact = ModelArtifact::new(
            Arc::new(ConstRegressor(49.6)),
            vec!["nvd_vuln_count".to_string()],
            "memory",
        )
        .unwrap();
        let model = RiskModel::preloaded(artifact);

        let prediction = model.predict(&FeatureVector::new()).unwrap();
        assert_eq!(prediction.base_score, 50);
        assert!((prediction.raw - 49.6).abs() < 1e-4);

        let status = model.status();
        assert!(status.loaded);
        assert_eq!(status.columns, 1);
        assert_eq!(status.location, "memory");
    }

    #[test]
    fn test_status_does_not_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let model = RiskModel::new(Box::new(CountingStore {
            loads: loads.clone(),
            fail: false,
        }));

        let status = model.status();
        assert!(!status.loaded);
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prediction_rounding() {
        assert_eq!(Prediction::from_raw(12.4).base_score, 12);
        assert_eq!(Prediction::from_raw(12.5).base_score, 13);
        assert_eq!(Prediction::from_raw(-3.6).base_score, -4);
    }
}
