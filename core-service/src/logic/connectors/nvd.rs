//! NVD Connector
//!
//! Known-vulnerability count from the NVD CVE API 2.0 keyword search.
//! Works without a key; a key only lifts upstream rate limits.

use async_trait::async_trait;

use super::types::{Applicability, ConnectorError, ConnectorId, NvdResponse};
use super::{check_status, Connector};
use crate::logic::signals::SignalRecord;
use crate::logic::target::Target;

const NVD_API_BASE: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

pub const KEY_VULN_COUNT: &str = "nvd_vuln_count";

pub struct NvdConnector {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl NvdConnector {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: NVD_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Connector for NvdConnector {
    fn id(&self) -> ConnectorId {
        ConnectorId::Nvd
    }

    fn applicability(&self) -> Applicability {
        Applicability::DomainOnly
    }

    fn defaults(&self) -> SignalRecord {
        SignalRecord::new().with(KEY_VULN_COUNT, 0i64)
    }

    async fn fetch(&self, target: &Target) -> Result<SignalRecord, ConnectorError> {
        let keyword = product_keyword(target.value());

        let mut request = self
            .client
            .get(&self.base_url)
            // only totalResults is read
            .query(&[("keywordSearch", keyword), ("resultsPerPage", "1")]);
        if let Some(key) = self.api_key.as_deref() {
            request = request.header("apiKey", key);
        }

        let response = request.send().await?;
        check_status(&response)?;

        let body: NvdResponse = response.json().await?;
        Ok(SignalRecord::new().with(KEY_VULN_COUNT, body.total_results as i64))
    }
}

/// Second-level label as a product hint: `www.wordpress.org` → `wordpress`
fn product_keyword(domain: &str) -> &str {
    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
    match labels.len() {
        0 => domain,
        1 => labels[0],
        n => labels[n - 2],
    }
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

    async fn nvd_server() -> String {
        let router = Router::new().route(
            "/cves",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                if q.get("resultsPerPage").map(String::as_str) != Some("1") {
                    return (StatusCode::BAD_REQUEST, Json(json!({})));
                }
                match q.get("keywordSearch").map(String::as_str) {
                    Some("wordpress") => (
                        StatusCode::OK,
                        Json(json!({"resultsPerPage": 1, "startIndex": 0, "totalResults": 1234, "vulnerabilities": []})),
                    ),
                    Some("overloaded") => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))),
                    _ => (StatusCode::OK, Json(json!({"totalResults": 0, "vulnerabilities": []}))),
                }
            }),
        );
        serve(router).await
    }

    #[tokio::test]
    async fn test_fetch_searches_product_keyword() {
        let url = nvd_server().await;
        let nvd = NvdConnector::new(reqwest::Client::new(), None).with_base_url(format!("{}/cves", url));

        let signals = nvd.fetch(&classify("www.wordpress.org").unwrap()).await.unwrap();
        assert_eq!(signals.int(KEY_VULN_COUNT), 1234);

        let signals = nvd.fetch(&classify("example.com").unwrap()).await.unwrap();
        assert_eq!(signals.int(KEY_VULN_COUNT), 0);

        let err = nvd.fetch(&classify("api.overloaded.io").unwrap()).await.unwrap_err();
        assert_eq!(err, ConnectorError::Http(503));
    }

    #[test]
    fn test_product_keyword() {
        assert_eq!(product_keyword("wordpress.org"), "wordpress");
        assert_eq!(product_keyword("www.apache.org"), "apache");
        assert_eq!(product_keyword("localhost"), "localhost");
    }

    #[test]
    fn test_parse_total_results() {
        let body = r#"{"resultsPerPage":1,"startIndex":0,"totalResults":1234,"vulnerabilities":[]}"#;
        let parsed: NvdResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.total_results, 1234);
    }
}
