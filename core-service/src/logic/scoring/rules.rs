//! Boost Rules & Category Bounds
//!
//! The adjustment stage as data: a versioned table of named rules, each
//! reading one blender signal and mapping it to a boost through thresholds.
//! No blending logic lives here.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::BlendSignals;

// ============================================================================
// CATEGORY BOUNDS
// ============================================================================

/// Scores at or below this are Low
pub const LOW_MAX: i64 = 40;

/// Scores at or below this (and above LOW_MAX) are Medium
pub const MEDIUM_MAX: i64 = 70;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

/// Version of the built-in table
pub const DEFAULT_TABLE_VERSION: u32 = 1;

// ============================================================================
// TABLE TYPES
// ============================================================================

/// Boost applied once the signal reaches `min`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min: f64,
    pub boost: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostRule {
    /// Name shown in the score breakdown
    pub name: String,
    /// Blender signal the rule reads (see [`BlendSignals::value`])
    pub signal: String,
    pub tiers: Vec<Tier>,
}

impl BoostRule {
    fn new(name: &str, signal: &str, tiers: &[(f64, i64)]) -> Self {
        Self {
            name: name.to_string(),
            signal: signal.to_string(),
            tiers: tiers.iter().map(|&(min, boost)| Tier { min, boost }).collect(),
        }
    }

    /// Boost of the highest tier reached, 0 below every tier
    pub fn evaluate(&self, value: f64) -> i64 {
        self.tiers
            .iter()
            .filter(|t| value >= t.min)
            .max_by(|a, b| a.min.total_cmp(&b.min))
            .map(|t| t.boost)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostTable {
    pub version: u32,
    pub rules: Vec<BoostRule>,
}

#[derive(Debug, Error)]
pub enum BoostTableError {
    #[error("cannot read boost table: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse boost table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid boost table: {0}")]
    Invalid(String),
}

impl Default for BoostTable {
    fn default() -> Self {
        Self {
            version: DEFAULT_TABLE_VERSION,
            rules: vec![
                BoostRule::new("vt_boost", "vt_signals", &[(1.0, 15), (2.0, 30), (4.0, 45)]),
                BoostRule::new("tls_boost", "ssl_issues", &[(1.0, 12)]),
                BoostRule::new("pwned_boost", "pwned_count", &[(1.0, 8), (100.0, 18)]),
                BoostRule::new(
                    "vuln_services_boost",
                    "shodan_vuln_services",
                    &[(1.0, 8), (5.0, 18)],
                ),
                BoostRule::new("open_ports_boost", "shodan_open_ports", &[(10.0, 5)]),
                BoostRule::new("nvd_boost", "nvd_vuln_count", &[(10.0, 7)]),
            ],
        }
    }
}

impl BoostTable {
    pub fn from_json(json: &str) -> Result<Self, BoostTableError> {
        let table: BoostTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, BoostTableError> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        log::info!(
            "Loaded boost table v{} ({} rules) from {}",
            table.version,
            table.rules.len(),
            path.display()
        );
        Ok(table)
    }

    /// Table from `path`, built-in table when unset
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, BoostTableError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), BoostTableError> {
        let mut names = HashSet::new();
        for rule in &self.rules {
            if rule.name.trim().is_empty() {
                return Err(BoostTableError::Invalid("rule with empty name".to_string()));
            }
            if !names.insert(rule.name.as_str()) {
                return Err(BoostTableError::Invalid(format!("duplicate rule: {}", rule.name)));
            }
            if !BlendSignals::is_known(&rule.signal) {
                return Err(BoostTableError::Invalid(format!(
                    "rule {} reads unknown signal {}",
                    rule.name, rule.signal
                )));
            }
            if rule.tiers.is_empty() {
                return Err(BoostTableError::Invalid(format!("rule {} has no tiers", rule.name)));
            }
            if rule.tiers.iter().any(|t| !t.min.is_finite()) {
                return Err(BoostTableError::Invalid(format!(
                    "rule {} has a non-finite threshold",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}
