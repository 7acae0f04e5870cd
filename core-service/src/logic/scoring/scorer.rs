//! Risk Scorer
//!
//! Two explicit stages: the model produces a base score, then the blender
//! applies the boost table. A missing model stops here with an error; it is
//! never replaced by a default score.

use std::sync::Arc;

use super::blender::blend;
use super::rules::BoostTable;
use super::types::{BlendSignals, EchoedSignals, ScoreResult};
use crate::error::EngineResult;
use crate::logic::features::FeatureVector;
use crate::logic::model::RiskModel;
use crate::logic::signals::SignalRecord;

pub struct RiskScorer {
    model: Arc<RiskModel>,
    table: BoostTable,
}

impl RiskScorer {
    pub fn new(model: Arc<RiskModel>, table: BoostTable) -> Self {
        Self { model, table }
    }

    pub fn model(&self) -> &Arc<RiskModel> {
        &self.model
    }

    pub fn table(&self) -> &BoostTable {
        &self.table
    }

    pub fn score(&self, features: &FeatureVector, signals: &SignalRecord) -> EngineResult<ScoreResult> {
        let prediction = self.model.predict(features)?;

        let result = blend(
            prediction.base_score,
            prediction.raw,
            &BlendSignals::from_signals(signals),
            &EchoedSignals::from_signals(signals),
            &self.table,
        );

        log::info!(
            "Score {} ({}): base {} + boosts {}",
            result.score,
            result.category,
            result.breakdown.base_score,
            result.breakdown.total_boost()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::normalize;
    use crate::logic::model::{ModelArtifact, ModelError, ModelStore, Regressor};
    use crate::logic::scoring::RiskCategory;

    struct FixedRegressor(f32);

    impl Regressor for FixedRegressor {
        fn predict_row(&self, _row: &[f32]) -> Result<f32, ModelError> {
            Ok(self.0)
        }
    }

    struct MissingStore;

    impl ModelStore for MissingStore {
        fn load(&self) -> Result<ModelArtifact, ModelError> {
            Err(ModelError::NotFound("risk_model.onnx".to_string()))
        }

        fn location(&self) -> String {
            "nowhere".to_string()
        }
    }

    struct BrokenRegressor;

    impl Regressor for BrokenRegressor {
        fn predict_row(&self, _row: &[f32]) -> Result<f32, ModelError> {
            Err(ModelError::Inference("shape mismatch".to_string()))
        }
    }

    fn scorer_with(regressor: Arc<dyn Regressor>) -> RiskScorer {
        let artifact = ModelArtifact::new(
            regressor,
            vec!["ip_abuse_score".to_string(), "ssl_grade_num".to_string()],
            "memory",
        )
        .unwrap();
        RiskScorer::new(Arc::new(RiskModel::preloaded(artifact)), BoostTable::default())
    }

    #[test]
    fn test_two_stage_score() {
        let scorer = scorer_with(Arc::new(FixedRegressor(50.0)));
        let record = SignalRecord::new()
            .with("vt_malicious_score", 3i64)
            .with("vt_suspicious_score", 1i64)
            .with("pwned_count", 150i64);

        let result = scorer.score(&normalize(&record), &record).unwrap();

        assert_eq!(result.breakdown.base_score, 50);
        assert_eq!(result.breakdown.final_before_clamp, 113);
        assert_eq!(result.score, 100);
        assert_eq!(result.category, RiskCategory::High);
        assert_eq!(result.raw, 50.0);
    }

    #[test]
    fn test_model_unavailable_propagates() {
        let scorer = RiskScorer::new(
            Arc::new(RiskModel::new(Box::new(MissingStore))),
            BoostTable::default(),
        );
        let record = SignalRecord::new().with("pwned_count", 150i64);

        let err = scorer.score(&normalize(&record), &record).unwrap_err();
        assert!(err.is_model_unavailable());
    }

    #[test]
    fn test_inference_failure_is_not_unavailable() {
        let scorer = scorer_with(Arc::new(BrokenRegressor));
        let record = SignalRecord::new();

        let err = scorer.score(&normalize(&record), &record).unwrap_err();
        assert!(!err.is_model_unavailable());
        assert!(matches!(err, crate::error::EngineError::Inference(_)));
    }
}
