//! Scan Cache
//!
//! Keeps the last scan per target so a report call can reuse it instead of
//! rescanning. One JSON file per sanitized target name.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::orchestrator::ScanReport;
use crate::constants;

/// A cached scan plus when it was stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedScan {
    pub stored_at: chrono::DateTime<Utc>,
    pub report: ScanReport,
}

pub trait ScanCache: Send + Sync {
    /// Fresh entry for the key, if any
    fn get(&self, cache_key: &str) -> Option<CachedScan>;

    /// Store a report; failures are logged, never surfaced
    fn put(&self, report: &ScanReport);
}

// ============================================================================
// FILE CACHE
// ============================================================================

pub struct FileScanCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileScanCache {
    /// TTLs outside chrono's range fall back to the default
    pub fn new(dir: impl Into<PathBuf>, ttl_hours: i64) -> Self {
        let ttl = Duration::try_hours(ttl_hours).unwrap_or_else(|| {
            log::warn!("Cache TTL of {}h out of range, using default", ttl_hours);
            Duration::hours(constants::DEFAULT_CACHE_TTL_HOURS)
        });
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, cache_key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key))
    }

    fn write(&self, report: &ScanReport) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let entry = CachedScan {
            stored_at: Utc::now(),
            report: report.clone(),
        };
        let json = serde_json::to_vec_pretty(&entry)?;
        fs::write(self.path_for(&report.target.cache_key()), json)
    }
}

impl ScanCache for FileScanCache {
    fn get(&self, cache_key: &str) -> Option<CachedScan> {
        let path = self.path_for(cache_key);
        let data = fs::read(&path).ok()?;

        let entry: CachedScan = match serde_json::from_slice(&data) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        if Utc::now() - entry.stored_at > self.ttl {
            log::debug!("Cache entry for {} expired", cache_key);
            return None;
        }

        Some(entry)
    }

    fn put(&self, report: &ScanReport) {
        if let Err(e) = self.write(report) {
            log::warn!("Failed to cache scan for {}: {}", report.target, e);
        }
    }
}

/// Cache that never stores anything
pub struct NoopScanCache;

impl ScanCache for NoopScanCache {
    fn get(&self, _cache_key: &str) -> Option<CachedScan> {
        None
    }

    fn put(&self, _report: &ScanReport) {}
}
