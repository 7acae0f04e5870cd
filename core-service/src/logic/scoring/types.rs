//! Scoring Types
//!
//! Inputs and outputs of the score blender. Data structures only.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logic::signals::{SignalRecord, SignalValue};

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// BLENDER INPUTS
// ============================================================================

/// Signals the adjustment stage reads. None of these is a model column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendSignals {
    pub vt_malicious: f64,
    pub vt_suspicious: f64,
    /// 1.0 when the TLS issues flag is truthy
    pub ssl_issues: f64,
    pub pwned_count: f64,
    pub shodan_vuln_services: f64,
    pub shodan_open_ports: f64,
    pub nvd_vuln_count: f64,
}

impl BlendSignals {
    /// Signal names boost rules may reference
    pub const SIGNALS: &'static [&'static str] = &[
        "vt_signals",
        "vt_malicious",
        "vt_suspicious",
        "ssl_issues",
        "pwned_count",
        "shodan_vuln_services",
        "shodan_open_ports",
        "nvd_vuln_count",
    ];

    pub fn from_signals(signals: &SignalRecord) -> Self {
        let pwned_count = if signals.contains_key("pwned_count") {
            signals.number("pwned_count")
        } else {
            signals.number("email_breach_count")
        };

        Self {
            vt_malicious: signals.number("vt_malicious_score"),
            vt_suspicious: signals.number("vt_suspicious_score"),
            ssl_issues: truthy(signals.get("ssl_issues")),
            pwned_count,
            shodan_vuln_services: signals.number("shodan_vuln_services"),
            shodan_open_ports: signals.number("shodan_open_ports"),
            nvd_vuln_count: signals.number("nvd_vuln_count"),
        }
    }

    pub fn is_known(signal: &str) -> bool {
        Self::SIGNALS.contains(&signal)
    }

    /// Value of a named signal; `vt_signals` is malicious + suspicious
    pub fn value(&self, signal: &str) -> Option<f64> {
        let v = match signal {
            "vt_signals" => self.vt_malicious + self.vt_suspicious,
            "vt_malicious" => self.vt_malicious,
            "vt_suspicious" => self.vt_suspicious,
            "ssl_issues" => self.ssl_issues,
            "pwned_count" => self.pwned_count,
            "shodan_vuln_services" => self.shodan_vuln_services,
            "shodan_open_ports" => self.shodan_open_ports,
            "nvd_vuln_count" => self.nvd_vuln_count,
            _ => return None,
        };
        Some(v)
    }
}

fn truthy(value: Option<&SignalValue>) -> f64 {
    if value.map(SignalValue::is_truthy).unwrap_or(false) {
        1.0
    } else {
        0.0
    }
}

/// Raw signal values repeated in the result for auditability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoedSignals {
    pub vt_malicious: i64,
    pub vt_suspicious: i64,
    pub vt_total_signals: i64,
    pub abuse_score: i64,
    pub ssl_issues: i64,
    pub pwned_count: i64,
    pub shodan_vulns: i64,
    pub shodan_open_ports: i64,
    pub nvd_vuln_count: i64,
}

impl EchoedSignals {
    pub fn from_signals(signals: &SignalRecord) -> Self {
        let blend = BlendSignals::from_signals(signals);
        let vt_malicious = signals.int("vt_malicious_score");
        let vt_suspicious = signals.int("vt_suspicious_score");
        let vt_total_signals = if signals.contains_key("vt_total_signals") {
            signals.int("vt_total_signals")
        } else {
            vt_malicious + vt_suspicious
        };

        Self {
            vt_malicious,
            vt_suspicious,
            vt_total_signals,
            abuse_score: signals.int("ip_abuse_score"),
            ssl_issues: blend.ssl_issues as i64,
            pwned_count: blend.pwned_count.round() as i64,
            shodan_vulns: signals.int("shodan_vuln_services"),
            shodan_open_ports: signals.int("shodan_open_ports"),
            nvd_vuln_count: signals.int("nvd_vuln_count"),
        }
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Every point between `base_score` and `final_score` is a named boost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: i64,
    #[serde(flatten)]
    pub boosts: BTreeMap<String, i64>,
    pub final_before_clamp: i64,
    pub final_score: i64,
}

impl ScoreBreakdown {
    pub fn total_boost(&self) -> i64 {
        self.boosts.values().sum()
    }
}

/// Immutable once built by the blender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Final score in [0, 100]
    pub score: i64,
    pub category: RiskCategory,
    /// Continuous model output
    pub raw: f64,
    pub breakdown: ScoreBreakdown,
    pub echoed_signals: EchoedSignals,
}
