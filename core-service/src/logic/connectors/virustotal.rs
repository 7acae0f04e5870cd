//! VirusTotal Connector
//!
//! Malware reputation for domains and IPs via the v3 API.
//! IP targets hit `/ip_addresses/{ip}`, domains hit `/domains/{domain}`.

use async_trait::async_trait;

use super::types::{Applicability, ConnectorError, ConnectorId, VtApiResponse, VtApiStats};
use super::{check_status, Connector};
use crate::logic::signals::SignalRecord;
use crate::logic::target::{Target, TargetKind};

// ============================================================================
// CONSTANTS
// ============================================================================

const VT_API_BASE: &str = "https://www.virustotal.com/api/v3";

pub const KEY_MALICIOUS: &str = "vt_malicious_score";
pub const KEY_SUSPICIOUS: &str = "vt_suspicious_score";
pub const KEY_TOTAL_SIGNALS: &str = "vt_total_signals";

// ============================================================================
// CONNECTOR
// ============================================================================

pub struct VirusTotalConnector {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl VirusTotalConnector {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: VT_API_BASE.to_string(),
        }
    }

    /// Point at a different API root (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn report_url(&self, target: &Target) -> String {
        match target.kind() {
            TargetKind::Ip => format!("{}/ip_addresses/{}", self.base_url, target.value()),
            TargetKind::Domain => format!("{}/domains/{}", self.base_url, target.value()),
        }
    }
}

#[async_trait]
impl Connector for VirusTotalConnector {
    fn id(&self) -> ConnectorId {
        ConnectorId::VirusTotal
    }

    fn applicability(&self) -> Applicability {
        Applicability::Both
    }

    fn defaults(&self) -> SignalRecord {
        stats_to_signals(&VtApiStats::default())
    }

    async fn fetch(&self, target: &Target) -> Result<SignalRecord, ConnectorError> {
        let api_key = self.api_key.as_deref().ok_or(ConnectorError::NotConfigured)?;

        let response = self
            .client
            .get(self.report_url(target))
            .header("x-apikey", api_key)
            .send()
            .await?;

        // Never analysed: no detections to report
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(self.defaults());
        }
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ConnectorError::NotConfigured);
        }
        check_status(&response)?;

        let body: VtApiResponse = response.json().await?;
        let stats = body.data.attributes.last_analysis_stats.unwrap_or_default();

        Ok(stats_to_signals(&stats))
    }
}

// ============================================================================
// PARSE RESPONSE
// ============================================================================

/// `vt_total_signals` counts engines that flagged the target at all
fn stats_to_signals(stats: &VtApiStats) -> SignalRecord {
    SignalRecord::new()
        .with(KEY_MALICIOUS, stats.malicious)
        .with(KEY_SUSPICIOUS, stats.suspicious)
        .with(KEY_TOTAL_SIGNALS, stats.malicious + stats.suspicious)
}
