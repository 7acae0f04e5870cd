//! Health check handler
//!
//! Liveness only: a missing model degrades `model_loaded`, not the status.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    model_loaded: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        model_loaded: state.engine.model_status().loaded,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
