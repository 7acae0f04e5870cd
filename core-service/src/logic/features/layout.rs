//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema the risk model was trained on.**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Breach exposure (0-2) ===
    "email_breached",        // 0: any breach attributed to the target
    "email_breach_count",    // 1: number of breaches
    "phone_breached",        // 2: phone numbers exposed

    // === IP reputation (3-4) ===
    "ip_abuse_score",        // 3: AbuseIPDB confidence 0-100
    "ip_abuse_reports",      // 4: AbuseIPDB report count

    // === Exposure (5-7) ===
    "shodan_open_ports",     // 5: distinct open ports
    "shodan_vuln_services",  // 6: services with known CVEs
    "nvd_vuln_count",        // 7: NVD keyword hits

    // === TLS (8-9) ===
    "ssl_grade_num",         // 8: encoded SSL Labs grade
    "ssl_expired",           // 9: leaf certificate expired

    // === Organisation (10-11) ===
    "social_presence_num",   // 10: encoded social presence
    "business_verified",     // 11: verified business listing

    // === Malware reputation (12-14) ===
    "vt_malicious_score",    // 12: engines flagging malicious
    "vt_suspicious_score",   // 13: engines flagging suspicious
    "vt_total_signals",      // 14: malicious + suspicious
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 15;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of version + ordered names, used to detect layout mismatches
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description exposed alongside model status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================
