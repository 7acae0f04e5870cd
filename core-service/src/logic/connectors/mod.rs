//! Connectors Module - Threat Intelligence Sources
//!
//! One adapter per external source. Every adapter is a black box with the
//! contract `fetch(target) -> partial signal mapping`; failures are returned
//! as [`ConnectorError`] and turned into documented defaults by the
//! orchestrator, never inside the adapter.
//!
//! # Components
//! - `virustotal.rs`: malware reputation (IP + domain)
//! - `shodan.rs`: open ports / vulnerable services (IP + domain)
//! - `abuseipdb.rs`: abuse reputation (IP only)
//! - `hibp.rs`: breach exposure (domain only)
//! - `ssl_labs.rs`: TLS grade (domain only, slow)
//! - `nvd.rs`: known vulnerability count (domain only)

pub mod types;
pub mod virustotal;
pub mod shodan;
pub mod abuseipdb;
pub mod hibp;
pub mod ssl_labs;
pub mod nvd;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::constants;
use crate::logic::signals::SignalRecord;
use crate::logic::target::Target;

pub use types::{Applicability, ConnectorError, ConnectorId, ConnectorOutcome};
pub use virustotal::VirusTotalConnector;
pub use shodan::ShodanConnector;
pub use abuseipdb::AbuseIpdbConnector;
pub use hibp::HibpConnector;
pub use ssl_labs::SslLabsConnector;
pub use nvd::NvdConnector;

// ============================================================================
// CONNECTOR TRAIT
// ============================================================================

/// Adapter to one intelligence source
#[async_trait]
pub trait Connector: Send + Sync {
    fn id(&self) -> ConnectorId;

    fn applicability(&self) -> Applicability;

    /// Slow sources get an explicit bound from the orchestrator
    fn is_slow(&self) -> bool {
        false
    }

    /// Documented neutral values substituted on failure
    fn defaults(&self) -> SignalRecord;

    async fn fetch(&self, target: &Target) -> Result<SignalRecord, ConnectorError>;
}

// ============================================================================
// SOURCE CONFIGURATION
// ============================================================================

/// API keys per source; `None` means the source reports `NotConfigured`
#[derive(Debug, Clone, Default)]
pub struct SourceKeys {
    pub virustotal: Option<String>,
    pub shodan: Option<String>,
    pub abuseipdb: Option<String>,
    pub hibp: Option<String>,
    pub nvd: Option<String>,
}

impl SourceKeys {
    pub fn from_env() -> Self {
        Self {
            virustotal: constants::get_api_key("VT_API_KEY"),
            shodan: constants::get_api_key("SHODAN_API_KEY"),
            abuseipdb: constants::get_api_key("ABUSEIPDB_API_KEY"),
            hibp: constants::get_api_key("HIBP_API_KEY"),
            nvd: constants::get_api_key("NVD_API_KEY"),
        }
    }

    /// Sources with a key set, for start-up logging without the keys themselves
    pub fn configured(&self) -> Vec<ConnectorId> {
        [
            (ConnectorId::VirusTotal, &self.virustotal),
            (ConnectorId::Shodan, &self.shodan),
            (ConnectorId::AbuseIpdb, &self.abuseipdb),
            (ConnectorId::Hibp, &self.hibp),
            (ConnectorId::Nvd, &self.nvd),
        ]
        .into_iter()
        .filter(|(_, key)| key.is_some())
        .map(|(id, _)| id)
        .collect()
    }
}

/// Shared HTTP client for all sources
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ConnectorError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(constants::USER_AGENT)
        .build()
        .map_err(|e| ConnectorError::Network(format!("failed to create HTTP client: {}", e)))
}

/// The full production source set
pub fn default_connectors(client: &reqwest::Client, keys: &SourceKeys) -> Vec<Arc<dyn Connector>> {
    vec![
        Arc::new(VirusTotalConnector::new(client.clone(), keys.virustotal.clone())),
        Arc::new(ShodanConnector::new(client.clone(), keys.shodan.clone())),
        Arc::new(AbuseIpdbConnector::new(client.clone(), keys.abuseipdb.clone())),
        Arc::new(HibpConnector::new(client.clone(), keys.hibp.clone())),
        Arc::new(SslLabsConnector::new(client.clone())),
        Arc::new(NvdConnector::new(client.clone(), keys.nvd.clone())),
    ]
}

// ============================================================================
// HELPERS
// ============================================================================

/// Map common non-success statuses; `Ok` means the body can be parsed
pub(crate) fn check_status(response: &reqwest::Response) -> Result<(), ConnectorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    match status.as_u16() {
        429 => Err(ConnectorError::RateLimited),
        code => Err(ConnectorError::Http(code)),
    }
}
