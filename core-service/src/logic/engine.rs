//! Risk Engine
//!
//! Facade over the whole pipeline. Built once at process start and shared
//! by reference; holds the only long-lived state (the model service).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cache::{FileScanCache, ScanCache};
use super::config::EngineConfig;
use super::connectors::{build_http_client, default_connectors};
use super::features::{normalize, FeatureVector};
use super::model::{open_store, ModelStatus, RiskModel};
use super::orchestrator::{ScanOrchestrator, ScanReport, SourceReport};
use super::scoring::{BoostTable, RiskCategory, RiskScorer, ScoreBreakdown, ScoreResult};
use super::signals::SignalRecord;
use super::target::{classify, Target, TargetKind};
use crate::error::{EngineError, EngineResult};

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// Everything produced by one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub scan_id: Uuid,
    pub target: Target,
    pub signals: SignalRecord,
    pub sources: Vec<SourceReport>,
    pub features: FeatureVector,
    pub result: ScoreResult,
    pub scanned_at: DateTime<Utc>,
}

/// JSON report for one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReportDocument {
    pub report_id: Uuid,
    pub target: String,
    pub target_type: TargetKind,
    pub score: i64,
    pub category: RiskCategory,
    pub raw: f64,
    pub breakdown: ScoreBreakdown,
    pub signals: SignalRecord,
    pub sources: Vec<SourceReport>,
    pub scanned_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    /// Built from a cached scan rather than a fresh one
    pub from_cache: bool,
}

impl ScanReportDocument {
    fn from_outcome(outcome: ScanOutcome, from_cache: bool) -> Self {
        Self {
            report_id: outcome.scan_id,
            target: outcome.target.value().to_string(),
            target_type: outcome.target.kind(),
            score: outcome.result.score,
            category: outcome.result.category,
            raw: outcome.result.raw,
            breakdown: outcome.result.breakdown,
            signals: outcome.signals,
            sources: outcome.sources,
            scanned_at: outcome.scanned_at,
            generated_at: Utc::now(),
            from_cache,
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct RiskEngine {
    orchestrator: ScanOrchestrator,
    cache: Box<dyn ScanCache>,
    scorer: Arc<RiskScorer>,
}

impl RiskEngine {
    pub fn new(orchestrator: ScanOrchestrator, cache: Box<dyn ScanCache>, scorer: RiskScorer) -> Self {
        Self {
            orchestrator,
            cache,
            scorer: Arc::new(scorer),
        }
    }

    /// Production wiring: real sources, file cache, configured model store
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        log::info!("Initializing risk engine: {}", config.summary());

        let client = build_http_client(config.http_timeout)
            .map_err(|e| EngineError::Internal(e.to_string()))?;
        let orchestrator = ScanOrchestrator::new(
            default_connectors(&client, &config.keys),
            config.orchestrator.clone(),
        );

        let cache = FileScanCache::new(&config.cache_dir, config.cache_ttl_hours);

        let store = open_store(config.model_url.as_deref(), &config.model_dir);
        let table = BoostTable::load_or_default(config.boost_table_path.as_deref())
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        let scorer = RiskScorer::new(Arc::new(RiskModel::new(store)), table);
        Ok(Self::new(orchestrator, Box::new(cache), scorer))
    }

    pub fn from_env() -> EngineResult<Self> {
        Self::from_config(EngineConfig::from_env())
    }

    /// Load the model ahead of the first scan. Failure is returned, not cached.
    pub async fn preload_model(&self) -> EngineResult<()> {
        let scorer = self.scorer.clone();
        tokio::task::spawn_blocking(move || scorer.model().artifact().map(|_| ()))
            .await?
            .map_err(EngineError::from)
    }

    /// Classify, fan out to sources, cache, normalize and score
    pub async fn scan(&self, raw_target: &str) -> EngineResult<ScanOutcome> {
        let target = classify(raw_target)?;

        let report = self.orchestrator.scan(&target).await;
        self.cache.put(&report);

        self.score_report(report).await
    }

    /// Report document, reusing a fresh cached scan when there is one
    pub async fn report(&self, raw_target: &str) -> EngineResult<ScanReportDocument> {
        let target = classify(raw_target)?;

        if let Some(cached) = self.cache.get(&target.cache_key()) {
            log::info!("Reusing cached scan for {} from {}", target, cached.stored_at);
            let outcome = self.score_report(cached.report).await?;
            return Ok(ScanReportDocument::from_outcome(outcome, true));
        }

        let outcome = self.scan(raw_target).await?;
        Ok(ScanReportDocument::from_outcome(outcome, false))
    }

    pub fn model_status(&self) -> ModelStatus {
        self.scorer.model().status()
    }

    /// Model work runs off the async workers: first use may load or download
    async fn score_report(&self, report: ScanReport) -> EngineResult<ScanOutcome> {
        let features = normalize(&report.signals);

        let scorer = self.scorer.clone();
        let signals = report.signals.clone();
        let model_features = features.clone();
        let result = tokio::task::spawn_blocking(move || scorer.score(&model_features, &signals))
            .await??;

        Ok(ScanOutcome {
            scan_id: Uuid::new_v4(),
            target: report.target,
            signals: report.signals,
            sources: report.sources,
            features,
            result,
            scanned_at: report.scanned_at,
        })
    }
}
