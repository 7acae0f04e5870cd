//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment; the helpers below
//! read the variable and fall back to the default.

use std::path::PathBuf;
use std::time::Duration;

/// Default bound for slow sources (TLS grading can take minutes upstream)
pub const DEFAULT_SLOW_TIMEOUT_SECS: u64 = 90;

/// Default per-request HTTP timeout for fast sources
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Default scan cache lifetime (hours)
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

/// Default merge precedence, highest priority first
pub const DEFAULT_MERGE_PRECEDENCE: &[&str] =
    &["virustotal", "ssl_labs", "shodan", "abuseipdb", "hibp", "nvd"];

/// Model artifact file names
pub const MODEL_FILE: &str = "risk_model.onnx";
pub const MODEL_COLUMNS_FILE: &str = "model_columns.json";
pub const MODEL_CHECKSUM_FILE: &str = "risk_model.sha256";

/// User agent sent to every intelligence source
pub const USER_AGENT: &str = concat!("RiskScan/", env!("CARGO_PKG_VERSION"));

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "RiskScan";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Read an API key; empty values count as unset
pub fn get_api_key(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// Get slow-source timeout from environment or use default
pub fn get_slow_timeout() -> Duration {
    let secs = std::env::var("RISKSCAN_SLOW_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SLOW_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Get HTTP timeout from environment or use default
pub fn get_http_timeout() -> Duration {
    let secs = std::env::var("RISKSCAN_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Get cache TTL from environment or use default
pub fn get_cache_ttl_hours() -> i64 {
    std::env::var("RISKSCAN_CACHE_TTL_HOURS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CACHE_TTL_HOURS)
}

/// Get merge precedence (comma separated source ids) or use default
pub fn get_merge_precedence() -> Vec<String> {
    match std::env::var("RISKSCAN_MERGE_PRECEDENCE") {
        Ok(list) if !list.trim().is_empty() => list
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => DEFAULT_MERGE_PRECEDENCE.iter().map(|s| s.to_string()).collect(),
    }
}

/// Get model directory from environment, else `<data_dir>/riskscan/model`
pub fn get_model_dir() -> PathBuf {
    std::env::var("RISKSCAN_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("riskscan")
                .join("model")
        })
}

/// Remote artifact store base URL (optional)
pub fn get_model_url() -> Option<String> {
    std::env::var("RISKSCAN_MODEL_URL")
        .ok()
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty())
}

/// Get scan cache directory from environment, else `<cache_dir>/riskscan/scans`
pub fn get_cache_dir() -> PathBuf {
    std::env::var("RISKSCAN_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("riskscan")
                .join("scans")
        })
}

/// Optional path to a JSON boost table
pub fn get_boost_table_path() -> Option<PathBuf> {
    std::env::var("RISKSCAN_BOOST_TABLE")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}
