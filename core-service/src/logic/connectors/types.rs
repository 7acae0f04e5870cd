//! Connector Types
//!
//! Identity, applicability and outcome types shared by every source, plus the
//! serde shapes used to parse upstream API responses.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::signals::SignalRecord;
use crate::logic::target::TargetKind;

// ============================================================================
// IDENTITY
// ============================================================================

/// Known intelligence sources, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorId {
    VirusTotal,
    Shodan,
    AbuseIpdb,
    Hibp,
    SslLabs,
    Nvd,
}

impl ConnectorId {
    pub const ALL: [ConnectorId; 6] = [
        ConnectorId::VirusTotal,
        ConnectorId::Shodan,
        ConnectorId::AbuseIpdb,
        ConnectorId::Hibp,
        ConnectorId::SslLabs,
        ConnectorId::Nvd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorId::VirusTotal => "virustotal",
            ConnectorId::Shodan => "shodan",
            ConnectorId::AbuseIpdb => "abuseipdb",
            ConnectorId::Hibp => "hibp",
            ConnectorId::SslLabs => "ssl_labs",
            ConnectorId::Nvd => "nvd",
        }
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConnectorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ConnectorId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| format!("unknown source: {}", s))
    }
}

/// Which target kinds a source understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    IpOnly,
    DomainOnly,
    Both,
}

impl Applicability {
    pub fn applies_to(&self, kind: TargetKind) -> bool {
        matches!(
            (self, kind),
            (Applicability::Both, _)
                | (Applicability::IpOnly, TargetKind::Ip)
                | (Applicability::DomainOnly, TargetKind::Domain)
        )
    }
}

// ============================================================================
// ERRORS & OUTCOMES
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum ConnectorError {
    #[error("API key not configured")]
    NotConfigured,
    #[error("rate limited")]
    RateLimited,
    #[error("HTTP status {0}")]
    Http(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("timed out after {0}ms")]
    Timeout(u64),
    #[error("source task failed: {0}")]
    Crashed(String),
}

impl ConnectorError {
    /// Timeouts are reported separately from other failures
    pub fn is_timeout(&self) -> bool {
        matches!(self, ConnectorError::Timeout(_))
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ConnectorError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            ConnectorError::Http(status.as_u16())
        } else {
            ConnectorError::Network(err.to_string())
        }
    }
}

/// Per-source result threaded through the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorOutcome {
    Ok(SignalRecord),
    Degraded {
        signals: SignalRecord,
        reason: ConnectorError,
    },
}

impl ConnectorOutcome {
    pub fn signals(&self) -> &SignalRecord {
        match self {
            ConnectorOutcome::Ok(signals) => signals,
            ConnectorOutcome::Degraded { signals, .. } => signals,
        }
    }

    pub fn into_signals(self) -> SignalRecord {
        match self {
            ConnectorOutcome::Ok(signals) => signals,
            ConnectorOutcome::Degraded { signals, .. } => signals,
        }
    }

    pub fn reason(&self) -> Option<&ConnectorError> {
        match self {
            ConnectorOutcome::Ok(_) => None,
            ConnectorOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ConnectorOutcome::Degraded { .. })
    }
}

// ============================================================================
// API RESPONSE TYPES
// ============================================================================

/// VirusTotal `/domains/{d}` and `/ip_addresses/{ip}`
#[derive(Debug, Deserialize)]
pub struct VtApiResponse {
    pub data: VtApiData,
}

#[derive(Debug, Deserialize)]
pub struct VtApiData {
    pub attributes: VtApiAttributes,
}

#[derive(Debug, Deserialize)]
pub struct VtApiAttributes {
    pub last_analysis_stats: Option<VtApiStats>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VtApiStats {
    #[serde(default)]
    pub malicious: u32,
    #[serde(default)]
    pub suspicious: u32,
    #[serde(default)]
    pub undetected: u32,
    #[serde(default)]
    pub harmless: u32,
    #[serde(default)]
    pub timeout: u32,
}

/// Shodan `/shodan/host/{ip}`
#[derive(Debug, Deserialize)]
pub struct ShodanHost {
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub data: Vec<ShodanService>,
}

#[derive(Debug, Deserialize)]
pub struct ShodanService {
    pub port: Option<u16>,
    #[serde(default)]
    pub vulns: HashMap<String, serde_json::Value>,
}

/// AbuseIPDB `/api/v2/check`
#[derive(Debug, Deserialize)]
pub struct AbuseCheckResponse {
    pub data: AbuseCheckData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbuseCheckData {
    #[serde(default)]
    pub abuse_confidence_score: u32,
    #[serde(default)]
    pub total_reports: u32,
}

/// HIBP `/breaches?domain=`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HibpBreach {
    pub name: String,
    #[serde(default)]
    pub pwn_count: u64,
}

/// SSL Labs `/analyze`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslLabsHost {
    pub status: String,
    pub status_message: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<SslLabsEndpoint>,
    #[serde(default)]
    pub certs: Vec<SslLabsCert>,
}

#[derive(Debug, Deserialize)]
pub struct SslLabsEndpoint {
    pub grade: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslLabsCert {
    /// Milliseconds since epoch
    pub not_after: Option<i64>,
}

/// NVD CVE API 2.0
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NvdResponse {
    #[serde(default)]
    pub total_results: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_id_round_trip_names() {
        for id in ConnectorId::ALL {
            assert_eq!(id.as_str().parse::<ConnectorId>().unwrap(), id);
        }
        assert_eq!("SSL-Labs".parse::<ConnectorId>().unwrap(), ConnectorId::SslLabs);
        assert!("whois".parse::<ConnectorId>().is_err());
    }

    #[test]
    fn test_applicability() {
        assert!(Applicability::IpOnly.applies_to(TargetKind::Ip));
        assert!(!Applicability::IpOnly.applies_to(TargetKind::Domain));
        assert!(Applicability::DomainOnly.applies_to(TargetKind::Domain));
        assert!(!Applicability::DomainOnly.applies_to(TargetKind::Ip));
        assert!(Applicability::Both.applies_to(TargetKind::Ip));
        assert!(Applicability::Both.applies_to(TargetKind::Domain));
    }

    #[test]
    fn test_parse_abuse_response() {
        let body = r#"{"data":{"ipAddress":"1.2.3.4","abuseConfidenceScore":87,"totalReports":12}}"#;
        let parsed: AbuseCheckResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.abuse_confidence_score, 87);
        assert_eq!(parsed.data.total_reports, 12);
    }

    #[test]
    fn test_parse_ssl_labs_response() {
        let body = r#"{
            "host": "example.com",
            "status": "READY",
            "endpoints": [{"ipAddress": "93.184.216.34", "grade": "B"}],
            "certs": [{"subject": "CN=example.com", "notAfter": 1700000000000}]
        }"#;
        let parsed: SslLabsHost = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "READY");
        assert_eq!(parsed.endpoints[0].grade.as_deref(), Some("B"));
        assert_eq!(parsed.certs[0].not_after, Some(1_700_000_000_000));
    }
}
