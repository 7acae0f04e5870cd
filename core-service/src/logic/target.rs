//! Target Classifier
//!
//! Decides whether an input is an IP literal or a domain. Pure, no network.

use std::fmt;
use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Everything outside this set is replaced in cache keys
static UNSAFE_KEY_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static regex"));

/// Longest DNS name we accept
const MAX_TARGET_LEN: usize = 253;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Ip,
    Domain,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Ip => "ip",
            TargetKind::Domain => "domain",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified, normalized scan target. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    value: String,
    kind: TargetKind,
}

impl Target {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn is_ip(&self) -> bool {
        self.kind == TargetKind::Ip
    }

    /// Filesystem/cache safe identifier
    pub fn cache_key(&self) -> String {
        sanitize(&self.value)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify a raw target string.
///
/// IPv4/IPv6 literals (IPv6 optionally bracketed) become [`TargetKind::Ip`] in
/// canonical form; anything else is a lower-cased domain without trailing dot.
pub fn classify(raw: &str) -> EngineResult<Target> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(EngineError::MalformedTarget("target is empty".to_string()));
    }
    if trimmed.len() > MAX_TARGET_LEN {
        return Err(EngineError::MalformedTarget(format!(
            "target longer than {} characters",
            MAX_TARGET_LEN
        )));
    }
    if trimmed
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/')
    {
        return Err(EngineError::MalformedTarget(format!(
            "target contains invalid characters: {:?}",
            trimmed
        )));
    }

    let unbracketed = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    if let Ok(ip) = unbracketed.parse::<IpAddr>() {
        return Ok(Target {
            value: ip.to_string(),
            kind: TargetKind::Ip,
        });
    }

    let domain = trimmed.trim_end_matches('.').to_lowercase();
    if domain.is_empty() {
        return Err(EngineError::MalformedTarget("target is empty".to_string()));
    }

    Ok(Target {
        value: domain,
        kind: TargetKind::Domain,
    })
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
pub fn sanitize(value: &str) -> String {
    UNSAFE_KEY_CHARS.replace_all(value, "_").into_owned()
}

// ============================================================================
// TESTS
// ============================================================================
