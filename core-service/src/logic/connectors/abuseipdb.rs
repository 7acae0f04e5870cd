//! AbuseIPDB Connector
//!
//! Community abuse reputation. Only meaningful for IP addresses.

use async_trait::async_trait;

use super::types::{AbuseCheckResponse, Applicability, ConnectorError, ConnectorId};
use super::{check_status, Connector};
use crate::logic::signals::SignalRecord;
use crate::logic::target::Target;

const ABUSEIPDB_API_BASE: &str = "https://api.abuseipdb.com/api/v2";

/// Reports older than this are ignored upstream
const MAX_AGE_DAYS: &str = "90";

pub const KEY_ABUSE_SCORE: &str = "ip_abuse_score";
pub const KEY_ABUSE_REPORTS: &str = "ip_abuse_reports";

pub struct AbuseIpdbConnector {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl AbuseIpdbConnector {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: ABUSEIPDB_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Connector for AbuseIpdbConnector {
    fn id(&self) -> ConnectorId {
        ConnectorId::AbuseIpdb
    }

    fn applicability(&self) -> Applicability {
        Applicability::IpOnly
    }

    fn defaults(&self) -> SignalRecord {
        SignalRecord::new()
            .with(KEY_ABUSE_SCORE, 0i64)
            .with(KEY_ABUSE_REPORTS, 0i64)
    }

    async fn fetch(&self, target: &Target) -> Result<SignalRecord, ConnectorError> {
        let api_key = self.api_key.as_deref().ok_or(ConnectorError::NotConfigured)?;

        let response = self
            .client
            .get(format!("{}/check", self.base_url))
            .header("Key", api_key)
            .header("Accept", "application/json")
            .query(&[("ipAddress", target.value()), ("maxAgeInDays", MAX_AGE_DAYS)])
            .send()
            .await?;
        check_status(&response)?;

        let body: AbuseCheckResponse = response.json().await?;

        Ok(SignalRecord::new()
            .with(KEY_ABUSE_SCORE, body.data.abuse_confidence_score.min(100))
            .with(KEY_ABUSE_REPORTS, body.data.total_reports))
    }
}
