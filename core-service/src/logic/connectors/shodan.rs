//! Shodan Connector
//!
//! Exposed ports and services with known vulnerabilities. Passive lookup of
//! Shodan's index only; the target itself is never contacted.
//! Domains are resolved through Shodan DNS first, then looked up as a host.

use std::collections::HashMap;

use async_trait::async_trait;

use super::types::{Applicability, ConnectorError, ConnectorId, ShodanHost};
use super::{check_status, Connector};
use crate::logic::signals::SignalRecord;
use crate::logic::target::{Target, TargetKind};

const SHODAN_API_BASE: &str = "https://api.shodan.io";

pub const KEY_OPEN_PORTS: &str = "shodan_open_ports";
pub const KEY_VULN_SERVICES: &str = "shodan_vuln_services";

pub struct ShodanConnector {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl ShodanConnector {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: SHODAN_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve a hostname through Shodan DNS; `None` when it doesn't resolve
    async fn resolve(&self, domain: &str, api_key: &str) -> Result<Option<String>, ConnectorError> {
        let response = self
            .client
            .get(format!("{}/dns/resolve", self.base_url))
            .query(&[("hostnames", domain), ("key", api_key)])
            .send()
            .await?;
        check_status(&response)?;

        let mut resolved: HashMap<String, Option<String>> = response.json().await?;
        Ok(resolved.remove(domain).flatten())
    }

    async fn host(&self, ip: &str, api_key: &str) -> Result<SignalRecord, ConnectorError> {
        let response = self
            .client
            .get(format!("{}/shodan/host/{}", self.base_url, ip))
            .query(&[("key", api_key)])
            .send()
            .await?;

        // Not in the index: nothing exposed that Shodan knows about
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(self.defaults());
        }
        check_status(&response)?;

        let host: ShodanHost = response.json().await?;
        Ok(host_to_signals(&host))
    }
}

#[async_trait]
impl Connector for ShodanConnector {
    fn id(&self) -> ConnectorId {
        ConnectorId::Shodan
    }

    fn applicability(&self) -> Applicability {
        Applicability::Both
    }

    fn defaults(&self) -> SignalRecord {
        SignalRecord::new()
            .with(KEY_OPEN_PORTS, 0i64)
            .with(KEY_VULN_SERVICES, 0i64)
    }

    async fn fetch(&self, target: &Target) -> Result<SignalRecord, ConnectorError> {
        let api_key = self.api_key.as_deref().ok_or(ConnectorError::NotConfigured)?;

        match target.kind() {
            TargetKind::Ip => self.host(target.value(), api_key).await,
            TargetKind::Domain => match self.resolve(target.value(), api_key).await? {
                Some(ip) => {
                    log::debug!("shodan resolved {} -> {}", target, ip);
                    self.host(&ip, api_key).await
                }
                None => Ok(self.defaults()),
            },
        }
    }
}

/// Open ports are de-duplicated; a service counts as vulnerable when Shodan
/// attached at least one CVE to its banner.
fn host_to_signals(host: &ShodanHost) -> SignalRecord {
    let mut ports = host.ports.clone();
    ports.extend(host.data.iter().filter_map(|s| s.port));
    ports.sort_unstable();
    ports.dedup();

    let vulnerable = host.data.iter().filter(|s| !s.vulns.is_empty()).count();

    SignalRecord::new()
        .with(KEY_OPEN_PORTS, ports.len())
        .with(KEY_VULN_SERVICES, vulnerable)
}
