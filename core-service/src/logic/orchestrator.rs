//! Scan Orchestrator
//!
//! Fans a target out to every applicable source, isolates per-source
//! failures and merges the results into one signal record.
//!
//! ## Rules
//! 1. A source failure never aborts the scan: it is replaced by that source's
//!    documented defaults and reported as degraded.
//! 2. Slow sources run under an explicit bound; on elapse the in-flight
//!    request is dropped and defaults are used.
//! 3. Merging is deterministic: sources are merged lowest precedence first,
//!    so on a key collision the higher-precedence source wins regardless of
//!    completion order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use super::connectors::{Connector, ConnectorError, ConnectorId, ConnectorOutcome};
use super::signals::SignalRecord;
use super::target::Target;
use crate::constants;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bound applied to sources that declare themselves slow
    pub slow_source_timeout: Duration,
    /// Merge precedence, highest priority first
    pub precedence: Vec<ConnectorId>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            slow_source_timeout: Duration::from_secs(constants::DEFAULT_SLOW_TIMEOUT_SECS),
            precedence: parse_precedence(constants::DEFAULT_MERGE_PRECEDENCE),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        Self {
            slow_source_timeout: constants::get_slow_timeout(),
            precedence: parse_precedence(&constants::get_merge_precedence()),
        }
    }
}

/// Unknown names are logged and skipped; duplicates keep their first position
pub fn parse_precedence<S: AsRef<str>>(names: &[S]) -> Vec<ConnectorId> {
    let mut order = Vec::new();
    for name in names {
        match name.as_ref().parse::<ConnectorId>() {
            Ok(id) if !order.contains(&id) => order.push(id),
            Ok(_) => {}
            Err(e) => log::warn!("Ignoring merge precedence entry: {}", e),
        }
    }
    order
}

// ============================================================================
// REPORT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Ok,
    Degraded,
}

/// What happened to one source during a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: ConnectorId,
    pub status: SourceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timed_out: bool,
    pub elapsed_ms: u64,
}

/// Unified output of one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: Target,
    pub signals: SignalRecord,
    pub sources: Vec<SourceReport>,
    pub scanned_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn degraded_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.status == SourceStatus::Degraded)
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

pub struct ScanOrchestrator {
    connectors: Vec<Arc<dyn Connector>>,
    config: OrchestratorConfig,
}

impl ScanOrchestrator {
    pub fn new(connectors: Vec<Arc<dyn Connector>>, config: OrchestratorConfig) -> Self {
        Self { connectors, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Sources whose applicability matches the target kind, in registration order
    pub fn applicable(&self, target: &Target) -> Vec<Arc<dyn Connector>> {
        self.connectors
            .iter()
            .filter(|c| c.applicability().applies_to(target.kind()))
            .cloned()
            .collect()
    }

    /// Run every applicable source concurrently and merge the results.
    ///
    /// Returns once each source has completed or been defaulted.
    pub async fn scan(&self, target: &Target) -> ScanReport {
        let applicable = self.applicable(target);
        log::info!(
            "Scanning {} ({}) with {} sources",
            target,
            target.kind(),
            applicable.len()
        );

        // Spawn everything before awaiting anything. Dropping the set (for
        // example when the caller drops this future) aborts in-flight sources.
        let mut tasks = JoinSet::new();
        let mut slots = Vec::with_capacity(applicable.len());
        for (slot, connector) in applicable.into_iter().enumerate() {
            slots.push((connector.id(), connector.defaults()));
            let bound = connector.is_slow().then_some(self.config.slow_source_timeout);
            let task_target = target.clone();

            tasks.spawn(async move {
                let started = Instant::now();
                let outcome = run_connector(connector.as_ref(), &task_target, bound).await;
                (slot, outcome, started.elapsed())
            });
        }

        let mut finished: Vec<Option<(ConnectorOutcome, Duration)>> = (0..slots.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome, elapsed)) => finished[slot] = Some((outcome, elapsed)),
                Err(e) => log::warn!("Source task crashed for {}: {}", target, e),
            }
        }

        let mut outcomes = Vec::with_capacity(slots.len());
        let mut sources = Vec::with_capacity(slots.len());

        for ((id, defaults), done) in slots.into_iter().zip(finished) {
            let (outcome, elapsed) = done.unwrap_or_else(|| {
                let reason = ConnectorError::Crashed("source task did not complete".to_string());
                (ConnectorOutcome::Degraded { signals: defaults, reason }, Duration::ZERO)
            });

            sources.push(SourceReport {
                source: id,
                status: if outcome.is_degraded() {
                    SourceStatus::Degraded
                } else {
                    SourceStatus::Ok
                },
                reason: outcome.reason().map(|r| r.to_string()),
                timed_out: outcome.reason().map(ConnectorError::is_timeout).unwrap_or(false),
                elapsed_ms: elapsed.as_millis() as u64,
            });
            outcomes.push((id, outcome));
        }

        let signals = merge(outcomes, &self.config.precedence);

        ScanReport {
            target: target.clone(),
            signals,
            sources,
            scanned_at: Utc::now(),
        }
    }
}

/// Fetch one source, substituting its defaults on any failure
async fn run_connector(
    connector: &dyn Connector,
    target: &Target,
    bound: Option<Duration>,
) -> ConnectorOutcome {
    let result = match bound {
        Some(limit) => match tokio::time::timeout(limit, connector.fetch(target)).await {
            Ok(result) => result,
            Err(_) => Err(ConnectorError::Timeout(limit.as_millis() as u64)),
        },
        None => connector.fetch(target).await,
    };

    match result {
        Ok(signals) => ConnectorOutcome::Ok(signals),
        Err(reason) => {
            log::warn!("Source {} degraded for {}: {}", connector.id(), target, reason);
            ConnectorOutcome::Degraded {
                signals: connector.defaults(),
                reason,
            }
        }
    }
}

// ============================================================================
// MERGE
// ============================================================================

/// Merge priority: listed sources rank by position, unlisted ones rank below
/// all of them (ties broken by declaration order, later wins).
fn merge_rank(id: ConnectorId, precedence: &[ConnectorId]) -> (usize, ConnectorId) {
    let priority = precedence
        .iter()
        .position(|p| *p == id)
        .map(|pos| precedence.len() - pos)
        .unwrap_or(0);
    (priority, id)
}

/// Union of all outcomes; on collision the higher-precedence source wins
pub fn merge(mut outcomes: Vec<(ConnectorId, ConnectorOutcome)>, precedence: &[ConnectorId]) -> SignalRecord {
    outcomes.sort_by_key(|(id, _)| merge_rank(*id, precedence));

    let mut merged = SignalRecord::new();
    let mut owner: std::collections::HashMap<String, ConnectorId> = std::collections::HashMap::new();

    for (id, outcome) in outcomes {
        for (key, value) in outcome.into_signals() {
            if let Some(previous) = owner.insert(key.clone(), id) {
                log::debug!("Signal {} from {} overrides {}", key, id, previous);
            }
            merged.insert(key, value);
        }
    }

    merged
}

// ============================================================================
// TESTS
// ============================================================================
