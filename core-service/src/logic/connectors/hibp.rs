//! Have I Been Pwned Connector
//!
//! Breach exposure for a domain: counts the public breaches attributed to it.
//! The breach catalogue endpoint works without a key; a key is sent when one
//! is configured.

use async_trait::async_trait;

use super::types::{Applicability, ConnectorError, ConnectorId, HibpBreach};
use super::{check_status, Connector};
use crate::logic::signals::SignalRecord;
use crate::logic::target::Target;

const HIBP_API_BASE: &str = "https://haveibeenpwned.com/api/v3";

pub const KEY_PWNED_COUNT: &str = "pwned_count";
pub const KEY_EMAIL_BREACHED: &str = "email_breached";
pub const KEY_EMAIL_BREACH_COUNT: &str = "email_breach_count";

pub struct HibpConnector {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl HibpConnector {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: HIBP_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Connector for HibpConnector {
    fn id(&self) -> ConnectorId {
        ConnectorId::Hibp
    }

    fn applicability(&self) -> Applicability {
        Applicability::DomainOnly
    }

    fn defaults(&self) -> SignalRecord {
        breaches_to_signals(&[])
    }

    async fn fetch(&self, target: &Target) -> Result<SignalRecord, ConnectorError> {
        let mut request = self
            .client
            .get(format!("{}/breaches", self.base_url))
            .query(&[("domain", target.value())]);
        if let Some(key) = self.api_key.as_deref() {
            request = request.header("hibp-api-key", key);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(self.defaults());
        }
        check_status(&response)?;

        let breaches: Vec<HibpBreach> = response.json().await?;
        log::debug!(
            "hibp: {} breaches for {} ({})",
            breaches.len(),
            target,
            breaches.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        Ok(breaches_to_signals(&breaches))
    }
}

fn breaches_to_signals(breaches: &[HibpBreach]) -> SignalRecord {
    let count = breaches.len();
    SignalRecord::new()
        .with(KEY_PWNED_COUNT, count)
        .with(KEY_EMAIL_BREACHED, count > 0)
        .with(KEY_EMAIL_BREACH_COUNT, count)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::logic::target::classify;
    use crate::testutil::serve;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn hibp_server() -> String {
        let router = Router::new().route(
            "/breaches",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                match q.get("domain").map(String::as_str) {
                    Some("adobe.com") => (
                        StatusCode::OK,
                        Json(json!([
                            {"Name": "Adobe", "Domain": "adobe.com", "PwnCount": 152445165},
                            {"Name": "AdobeForums", "Domain": "adobe.com", "PwnCount": 1000}
                        ])),
                    ),
                    Some("down.example") => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))),
                    _ => (StatusCode::NOT_FOUND, Json(json!({}))),
                }
            }),
        );
        serve(router).await
    }

    #[tokio::test]
    async fn test_fetch_counts_breaches_without_key() {
        let url = hibp_server().await;
        let hibp = HibpConnector::new(reqwest::Client::new(), None).with_base_url(url);

        let signals = hibp.fetch(&classify("adobe.com").unwrap()).await.unwrap();
        assert_eq!(signals.int(KEY_PWNED_COUNT), 2);
        assert_eq!(signals.int(KEY_EMAIL_BREACH_COUNT), 2);
    }

    #[tokio::test]
    async fn test_fetch_status_handling() {
        let url = hibp_server().await;
        let hibp = HibpConnector::new(reqwest::Client::new(), Some("key".into())).with_base_url(url);

        let clean = hibp.fetch(&classify("example.com").unwrap()).await.unwrap();
        assert_eq!(clean, hibp.defaults());

        let err = hibp.fetch(&classify("down.example").unwrap()).await.unwrap_err();
        assert_eq!(err, ConnectorError::Http(503));
    }

    #[test]
    fn test_breaches_to_signals() {
        let body = r#"[
            {"Name": "Adobe", "Domain": "adobe.com", "PwnCount": 152445165},
            {"Name": "AdobeForums", "Domain": "adobe.com", "PwnCount": 1000}
        ]"#;
        let breaches: Vec<HibpBreach> = serde_json::from_str(body).unwrap();
        let signals = breaches_to_signals(&breaches);

        assert_eq!(signals.int(KEY_PWNED_COUNT), 2);
        assert!(signals.get(KEY_EMAIL_BREACHED).unwrap().is_truthy());
        assert_eq!(signals.int(KEY_EMAIL_BREACH_COUNT), 2);
    }

    #[test]
    fn test_no_breaches() {
        let signals = breaches_to_signals(&[]);
        assert_eq!(signals.int(KEY_PWNED_COUNT), 0);
        assert!(!signals.get(KEY_EMAIL_BREACHED).unwrap().is_truthy());
    }
}
