//! RiskScan API Server
//!
//! Thin HTTP adapter over `riskscan-core`. Owns no scoring logic.
//!
//! # Routes
//!
//! ```text
//! GET  /health            liveness + model load state
//! POST /api/scan          {target} → scan + score
//! POST /api/report        {target} → JSON report (reuses cached scan)
//! GET  /api/model/status  model artifact + inference counters
//! ```

mod config;
mod error;
mod handlers;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use riskscan_core::RiskEngine;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (core `log` records are forwarded too); JSON lines in production
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "riskscan_api=debug,riskscan_core=info,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("RiskScan API starting ({})...", config.environment);

    let engine = RiskEngine::from_config(config.engine.clone())
        .context("failed to initialize risk engine")?;

    if config.preload_model {
        match engine.preload_model().await {
            Ok(()) => tracing::info!("Risk model loaded"),
            // Retried on first scan
            Err(e) => tracing::warn!("Risk model not loaded at start-up: {}", e),
        }
    }

    let state = AppState {
        engine: Arc::new(engine),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RiskEngine>,
    pub config: Arc<config::Config>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/scan", post(handlers::scan::scan))
        .route("/api/report", post(handlers::report::generate))
        .route("/api/model/status", get(handlers::model::status));

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
