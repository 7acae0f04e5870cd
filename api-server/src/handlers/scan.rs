//! Scan handlers

use axum::{extract::State, Json};
use riskscan_core::logic::orchestrator::SourceReport;
use riskscan_core::logic::scoring::ScoreResult;
use riskscan_core::logic::signals::SignalRecord;
use riskscan_core::logic::target::TargetKind;
use riskscan_core::ScanOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct ScanRequest {
    #[validate(length(min = 1, max = 253, message = "target must be 1-253 characters"))]
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub scan_id: Uuid,
    pub target: String,
    pub target_type: TargetKind,
    /// Merged raw source output
    pub osint: SignalRecord,
    pub sources: Vec<SourceReport>,
    /// Feature name → value
    pub features: serde_json::Value,
    pub result: ScoreResult,
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        Self {
            scan_id: outcome.scan_id,
            target: outcome.target.value().to_string(),
            target_type: outcome.target.kind(),
            osint: outcome.signals,
            sources: outcome.sources,
            features: outcome.features.to_json(),
            result: outcome.result,
        }
    }
}

/// Scan a domain or IP and score it
pub async fn scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> AppResult<Json<ScanResponse>> {
    req.validate()?;

    tracing::info!("Scan requested for {}", req.target);
    let outcome = state.engine.scan(&req.target).await?;

    tracing::info!(
        "Scan {} for {} finished: {} ({})",
        outcome.scan_id,
        outcome.target,
        outcome.result.score,
        outcome.result.category
    );
    Ok(Json(outcome.into()))
}
