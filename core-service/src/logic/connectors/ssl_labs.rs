//! SSL Labs Connector
//!
//! TLS grade for a domain via the SSL Labs v3 API. Assessments take from a
//! few seconds (cached upstream) to several minutes, so this source is marked
//! slow and the orchestrator bounds it independently of the HTTP timeout.

use std::time::Duration;

use async_trait::async_trait;

use super::types::{Applicability, ConnectorError, ConnectorId, SslLabsHost};
use super::{check_status, Connector};
use crate::logic::signals::SignalRecord;
use crate::logic::target::Target;

const SSL_LABS_API_BASE: &str = "https://api.ssllabs.com/api/v3";

/// Upstream asks clients to poll no faster than this while IN_PROGRESS
const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Grades that do not count as a TLS issue
const ACCEPTABLE_GRADES: &[&str] = &["A+", "A", "B"];

pub const KEY_GRADE: &str = "ssl_grade";
pub const KEY_ISSUES: &str = "ssl_issues";
pub const KEY_EXPIRED: &str = "ssl_expired";

/// Grade reported when no assessment is available
pub const GRADE_UNAVAILABLE: &str = "N/A";

pub struct SslLabsConnector {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
}

impl SslLabsConnector {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: SSL_LABS_API_BASE.to_string(),
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn analyze(&self, host: &str, start_new: bool) -> Result<SslLabsHost, ConnectorError> {
        let mut params = vec![("host", host), ("all", "done")];
        if start_new {
            params.push(("fromCache", "on"));
            params.push(("maxAge", "24"));
        }

        let response = self
            .client
            .get(format!("{}/analyze", self.base_url))
            .query(&params)
            .send()
            .await?;
        check_status(&response)?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Connector for SslLabsConnector {
    fn id(&self) -> ConnectorId {
        ConnectorId::SslLabs
    }

    fn applicability(&self) -> Applicability {
        Applicability::DomainOnly
    }

    fn is_slow(&self) -> bool {
        true
    }

    fn defaults(&self) -> SignalRecord {
        SignalRecord::new()
            .with(KEY_GRADE, GRADE_UNAVAILABLE)
            .with(KEY_ISSUES, 0i64)
            .with(KEY_EXPIRED, 0i64)
    }

    /// Polls until the assessment is READY or ERROR. No internal deadline:
    /// the orchestrator drops this future when its bound elapses.
    async fn fetch(&self, target: &Target) -> Result<SignalRecord, ConnectorError> {
        let mut report = self.analyze(target.value(), true).await?;

        loop {
            match report.status.as_str() {
                "READY" => break,
                "ERROR" => {
                    log::debug!(
                        "ssl labs: assessment error for {}: {}",
                        target,
                        report.status_message.as_deref().unwrap_or("unknown")
                    );
                    return Ok(self.defaults());
                }
                _ => {
                    tokio::time::sleep(self.poll_interval).await;
                    report = self.analyze(target.value(), false).await?;
                }
            }
        }

        Ok(report_to_signals(&report, chrono::Utc::now().timestamp_millis()))
    }
}

/// First endpoint's grade wins; expiry comes from the leaf certificate
fn report_to_signals(report: &SslLabsHost, now_ms: i64) -> SignalRecord {
    let grade = report
        .endpoints
        .iter()
        .find_map(|e| e.grade.as_deref())
        .map(str::trim)
        .filter(|g| !g.is_empty());

    let expired = report
        .certs
        .first()
        .and_then(|c| c.not_after)
        .map(|not_after| not_after < now_ms)
        .unwrap_or(false);

    let (grade, issues) = match grade {
        Some(g) => (g.to_string(), !ACCEPTABLE_GRADES.contains(&g)),
        None => (GRADE_UNAVAILABLE.to_string(), false),
    };

    SignalRecord::new()
        .with(KEY_GRADE, grade)
        .with(KEY_ISSUES, issues as i64)
        .with(KEY_EXPIRED, expired as i64)
}
