//! Report handler

use axum::{extract::State, Json};
use riskscan_core::logic::engine::ScanReportDocument;
use validator::Validate;

use super::scan::ScanRequest;
use crate::{AppResult, AppState};

/// JSON report for a target, reusing a recent scan when cached
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> AppResult<Json<ScanReportDocument>> {
    req.validate()?;

    let document = state.engine.report(&req.target).await?;
    tracing::info!(
        "Report {} for {} (cached scan: {})",
        document.report_id,
        document.target,
        document.from_cache
    );
    Ok(Json(document))
}
