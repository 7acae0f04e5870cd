//! Route tests
//!
//! Drive the router in-process with `oneshot`; sources and model are mocks.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use riskscan_core::logic::cache::NoopScanCache;
use riskscan_core::logic::connectors::{Applicability, Connector, ConnectorError, ConnectorId};
use riskscan_core::logic::model::{ModelArtifact, ModelError, ModelStore, Regressor, RiskModel};
use riskscan_core::logic::orchestrator::{OrchestratorConfig, ScanOrchestrator};
use riskscan_core::logic::scoring::{BoostTable, RiskScorer};
use riskscan_core::logic::signals::SignalRecord;
use riskscan_core::logic::target::Target;
use riskscan_core::{EngineConfig, RiskEngine};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{config::Config, create_router, AppState};

struct BreachSource;

#[async_trait]
impl Connector for BreachSource {
    fn id(&self) -> ConnectorId {
        ConnectorId::Hibp
    }

    fn applicability(&self) -> Applicability {
        Applicability::DomainOnly
    }

    fn defaults(&self) -> SignalRecord {
        SignalRecord::new().with("pwned_count", 0i64)
    }

    async fn fetch(&self, _target: &Target) -> Result<SignalRecord, ConnectorError> {
        Ok(SignalRecord::new().with("pwned_count", 150i64))
    }
}

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

fn app_with_model(model: RiskModel) -> Router {
    let engine = RiskEngine::new(
        ScanOrchestrator::new(vec![Arc::new(BreachSource)], OrchestratorConfig::default()),
        Box::new(NoopScanCache),
        RiskScorer::new(Arc::new(model), BoostTable::default()),
    );

    let config = Config {
        port: 0,
        environment: "test".to_string(),
        preload_model: false,
        engine: EngineConfig::from_env(),
    };

    create_router(AppState {
        engine: Arc::new(engine),
        config: Arc::new(config),
    })
}

fn app() -> Router {
    let artifact = ModelArtifact::new(
        Arc::new(FixedRegressor(40.0)),
        vec!["email_breach_count".to_string()],
        "memory",
    )
    .unwrap();
    app_with_model(RiskModel::preloaded(artifact))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_scan_returns_score() {
    let (status, body) = send(app(), post_json("/api/scan", json!({"target": "Example.com"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target"], "example.com");
    assert_eq!(body["target_type"], "domain");
    assert_eq!(body["osint"]["pwned_count"], 150);
    assert_eq!(body["features"]["email_breach_count"], 150.0);

    // 40 from the model + 18 breach boost
    assert_eq!(body["result"]["breakdown"]["base_score"], 40);
    assert_eq!(body["result"]["breakdown"]["pwned_boost"], 18);
    assert_eq!(body["result"]["score"], 58);
    assert_eq!(body["result"]["category"], "Medium");
    assert_eq!(body["result"]["echoed_signals"]["pwned_count"], 150);
    assert!(body["scan_id"].is_string());
}

#[tokio::test]
async fn test_ip_scan_skips_domain_sources() {
    let (status, body) = send(app(), post_json("/api/scan", json!({"target": "8.8.8.8"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target_type"], "ip");
    assert_eq!(body["sources"].as_array().unwrap().len(), 0);
    assert_eq!(body["result"]["score"], 40);
}

#[tokio::test]
async fn test_empty_target_is_bad_request() {
    let (status, body) = send(app(), post_json("/api/scan", json!({"target": ""}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_malformed_target_is_bad_request() {
    let (status, body) = send(app(), post_json("/api/scan", json!({"target": "exa mple.com"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Malformed target"));
}

#[tokio::test]
async fn test_missing_model_is_service_unavailable() {
    let app = app_with_model(RiskModel::new(Box::new(MissingStore)));
    let (status, body) = send(app, post_json("/api/scan", json!({"target": "example.com"}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_report() {
    let (status, body) = send(app(), post_json("/api/report", json!({"target": "example.com"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target"], "example.com");
    assert_eq!(body["score"], 58);
    assert_eq!(body["from_cache"], false);
    assert_eq!(body["breakdown"]["final_score"], 58);
}

#[tokio::test]
async fn test_model_status() {
    let (status, body) = send(app(), get("/api/model/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loaded"], true);
    assert_eq!(body["columns"], 1);
    assert_eq!(body["layout"]["feature_count"], 15);
}
