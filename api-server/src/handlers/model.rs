//! Model status handler

use axum::{extract::State, Json};
use riskscan_core::logic::model::ModelStatus;

use crate::AppState;

pub async fn status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.engine.model_status())
}
