//! Engine Configuration
//!
//! Everything the engine needs at construction, read from the environment
//! with the defaults in `constants.rs`.

use std::path::PathBuf;
use std::time::Duration;

use super::connectors::SourceKeys;
use super::orchestrator::OrchestratorConfig;
use crate::constants;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub keys: SourceKeys,
    /// Per-request timeout for source HTTP calls
    pub http_timeout: Duration,
    pub orchestrator: OrchestratorConfig,
    pub cache_dir: PathBuf,
    pub cache_ttl_hours: i64,
    pub model_dir: PathBuf,
    /// Remote artifact store; local directory only when unset
    pub model_url: Option<String>,
    /// JSON boost table; built-in table when unset
    pub boost_table_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            keys: SourceKeys::from_env(),
            http_timeout: constants::get_http_timeout(),
            orchestrator: OrchestratorConfig::from_env(),
            cache_dir: constants::get_cache_dir(),
            cache_ttl_hours: constants::get_cache_ttl_hours(),
            model_dir: constants::get_model_dir(),
            model_url: constants::get_model_url(),
            boost_table_path: constants::get_boost_table_path(),
        }
    }

    /// One-line summary safe to log (no keys)
    pub fn summary(&self) -> String {
        let sources: Vec<&str> = self.keys.configured().iter().map(|id| id.as_str()).collect();
        format!(
            "keys=[{}] http_timeout={}s slow_timeout={}s model={} cache={} ttl={}h",
            sources.join(","),
            self.http_timeout.as_secs(),
            self.orchestrator.slow_source_timeout.as_secs(),
            self.model_url
                .clone()
                .unwrap_or_else(|| self.model_dir.display().to_string()),
            self.cache_dir.display(),
            self.cache_ttl_hours
        )
    }
}
