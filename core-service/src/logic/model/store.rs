//! Model Store
//!
//! Where model artifacts come from. The local store reads a directory; the
//! remote store downloads into that directory once and then behaves like the
//! local store.
//!
//! Directory layout:
//! - `risk_model.onnx`: the regressor
//! - `model_columns.json`: ordered array of column names
//! - `risk_model.sha256`: optional hex digest of the model file

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use super::artifact::{ModelArtifact, OnnxRegressor};
use super::ModelError;
use crate::constants::{self, MODEL_CHECKSUM_FILE, MODEL_COLUMNS_FILE, MODEL_FILE};

/// Download timeout per artifact file
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

pub trait ModelStore: Send + Sync {
    fn load(&self) -> Result<ModelArtifact, ModelError>;

    /// Where artifacts are loaded from, for status output
    fn location(&self) -> String;
}

// ============================================================================
// LOCAL
// ============================================================================

pub struct LocalModelStore {
    dir: PathBuf,
}

impl LocalModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Model and schema both present
    pub fn is_populated(&self) -> bool {
        self.dir.join(MODEL_FILE).is_file() && self.dir.join(MODEL_COLUMNS_FILE).is_file()
    }

    fn read_columns(&self) -> Result<Vec<String>, ModelError> {
        let path = self.dir.join(MODEL_COLUMNS_FILE);
        let data = fs::read(&path)
            .map_err(|e| ModelError::NotFound(format!("{}: {}", path.display(), e)))?;
        serde_json::from_slice(&data).map_err(|e| ModelError::Schema(e.to_string()))
    }

    fn read_model(&self) -> Result<Vec<u8>, ModelError> {
        let path = self.dir.join(MODEL_FILE);
        if !path.is_file() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }
        fs::read(&path).map_err(|e| ModelError::Corrupt(format!("{}: {}", path.display(), e)))
    }

    fn verify_checksum(&self, model_bytes: &[u8]) -> Result<(), ModelError> {
        let path = self.dir.join(MODEL_CHECKSUM_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Ok(());
        };

        // Accept both a bare digest and `sha256sum` output
        let expected = content
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let actual = hex::encode(Sha256::digest(model_bytes));

        if expected != actual {
            return Err(ModelError::Checksum { expected, actual });
        }
        Ok(())
    }
}

impl ModelStore for LocalModelStore {
    fn load(&self) -> Result<ModelArtifact, ModelError> {
        log::info!("Loading risk model from: {}", self.dir.display());

        let model_bytes = self.read_model()?;
        let columns = self.read_columns()?;
        self.verify_checksum(&model_bytes)?;

        let regressor = OnnxRegressor::from_bytes(&model_bytes)?;
        let artifact = ModelArtifact::new(
            Arc::new(regressor),
            columns,
            self.dir.display().to_string(),
        )?;

        log::info!(
            "Risk model loaded ({} columns)",
            artifact.columns().len()
        );
        Ok(artifact)
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

// ============================================================================
// REMOTE
// ============================================================================

/// Fetches the artifact once into a local directory, then loads from there
pub struct RemoteModelStore {
    base_url: String,
    local: LocalModelStore,
}

impl RemoteModelStore {
    pub fn new(base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            local: LocalModelStore::new(cache_dir),
        }
    }

    fn fetch_all(&self) -> Result<(), ModelError> {
        fs::create_dir_all(self.local.dir())
            .map_err(|e| ModelError::Fetch(format!("cannot create model dir: {}", e)))?;

        self.fetch_file(MODEL_COLUMNS_FILE, true)?;
        self.fetch_file(MODEL_CHECKSUM_FILE, false)?;
        // Model last: its presence marks the cache as complete
        self.fetch_file(MODEL_FILE, true)?;
        Ok(())
    }

    fn fetch_file(&self, name: &str, required: bool) -> Result<(), ModelError> {
        let url = format!("{}/{}", self.base_url, name);
        log::info!("Fetching model artifact: {}", url);

        let response = match ureq::get(&url)
            .set("User-Agent", constants::USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .call()
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(404, _)) if !required => {
                log::debug!("Optional artifact {} not published", name);
                return Ok(());
            }
            Err(e) => return Err(ModelError::Fetch(format!("{}: {}", url, e))),
        };

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| ModelError::Fetch(format!("{}: {}", url, e)))?;

        // Write via temp file so a half-written artifact is never picked up
        let target = self.local.dir().join(name);
        let partial = self.local.dir().join(format!("{}.part", name));
        fs::write(&partial, &bytes)
            .and_then(|_| fs::rename(&partial, &target))
            .map_err(|e| ModelError::Fetch(format!("cannot write {}: {}", target.display(), e)))
    }
}

impl ModelStore for RemoteModelStore {
    fn load(&self) -> Result<ModelArtifact, ModelError> {
        if !self.local.is_populated() {
            self.fetch_all()?;
        }
        self.local.load()
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }
}

/// Remote store when a model URL is configured, local directory otherwise
pub fn open_store(model_url: Option<&str>, model_dir: &Path) -> Box<dyn ModelStore> {
    match model_url {
        Some(url) => Box::new(RemoteModelStore::new(url, model_dir)),
        None => Box::new(LocalModelStore::new(model_dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{serve, Hits};
    use axum::routing::get;
    use axum::Router;

    const ZERO_DIGEST: &str = "0000000000000000000000000000000000000000000000000000000000000000";

    /// Publishes columns and model; the checksum route only when `checksum` is set
    fn publish(hits: &Hits, checksum: Option<&'static str>) -> Router {
        let counted = |body: &'static [u8]| {
            let hits = hits.clone();
            get(move || {
                let hits = hits.clone();
                async move {
                    hits.hit();
                    body
                }
            })
        };

        let mut router = Router::new()
            .route(&format!("/v1/{}", MODEL_COLUMNS_FILE), counted(br#"["ip_abuse_score"]"#))
            .route(&format!("/v1/{}", MODEL_FILE), counted(b"onnx"));
        if let Some(digest) = checksum {
            router = router.route(&format!("/v1/{}", MODEL_CHECKSUM_FILE), counted(digest.as_bytes()));
        }
        router
    }

    fn write_columns(dir: &Path, body: &str) {
        fs::write(dir.join(MODEL_COLUMNS_FILE), body).unwrap();
    }

    #[test]
    fn test_open_store_picks_remote_when_url_set() {
        let dir = tempfile::tempdir().unwrap();

        let local = open_store(None, dir.path());
        assert_eq!(local.location(), dir.path().display().to_string());

        let remote = open_store(Some("http://models.local/v1/"), dir.path());
        assert_eq!(remote.location(), "http://models.local/v1");
    }

    #[test]
    fn test_missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalModelStore::new(dir.path());

        assert!(!store.is_populated());
        assert!(matches!(store.load(), Err(ModelError::NotFound(_))));
    }

    #[test]
    fn test_missing_columns_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MODEL_FILE), b"onnx").unwrap();

        let store = LocalModelStore::new(dir.path());
        assert!(matches!(store.load(), Err(ModelError::NotFound(_))));
    }

    #[test]
    fn test_bad_columns_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MODEL_FILE), b"onnx").unwrap();
        write_columns(dir.path(), r#"{"columns": "nope"}"#);

        let store = LocalModelStore::new(dir.path());
        assert!(matches!(store.load(), Err(ModelError::Schema(_))));
    }

    #[test]
    fn test_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MODEL_FILE), b"onnx").unwrap();
        write_columns(dir.path(), r#"["ip_abuse_score"]"#);
        fs::write(
            dir.path().join(MODEL_CHECKSUM_FILE),
            format!("{}  {}\n", "0".repeat(64), MODEL_FILE),
        )
        .unwrap();

        let store = LocalModelStore::new(dir.path());
        match store.load() {
            Err(ModelError::Checksum { expected, actual }) => {
                assert_eq!(expected, "0".repeat(64));
                assert_eq!(actual, hex::encode(Sha256::digest(b"onnx")));
            }
            other => panic!("expected checksum error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_remote_unreachable_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RemoteModelStore::new("http://127.0.0.1:9/models/", dir.path().join("model"));

        assert_eq!(store.location(), "http://127.0.0.1:9/models");
        assert!(matches!(store.load(), Err(ModelError::Fetch(_))));
    }

    #[test]
    fn test_remote_uses_local_copy_when_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MODEL_FILE), b"onnx").unwrap();
        write_columns(dir.path(), r#"["ip_abuse_score"]"#);
        fs::write(dir.path().join(MODEL_CHECKSUM_FILE), "f".repeat(64)).unwrap();

        // Unreachable URL: only the local copy can produce a checksum error
        let store = RemoteModelStore::new("http://127.0.0.1:9", dir.path());
        assert!(matches!(store.load(), Err(ModelError::Checksum { .. })));
    }

    #[test]
    fn test_remote_fetches_once_then_loads_locally() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let hits = Hits::default();
        let url = rt.block_on(serve(publish(&hits, Some(ZERO_DIGEST))));

        let dir = tempfile::tempdir().unwrap();
        let store = RemoteModelStore::new(format!("{}/v1/", url), dir.path());

        // Published digest does not match the published model
        assert!(matches!(store.load(), Err(ModelError::Checksum { .. })));
        assert_eq!(hits.count(), 3);
        assert_eq!(fs::read(dir.path().join(MODEL_FILE)).unwrap(), b"onnx");
        assert!(dir.path().join(MODEL_CHECKSUM_FILE).is_file());
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .count();
        assert_eq!(leftovers, 0);

        assert!(matches!(store.load(), Err(ModelError::Checksum { .. })));
        assert_eq!(hits.count(), 3);
    }

    #[test]
    fn test_remote_checksum_is_optional() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let hits = Hits::default();
        let url = rt.block_on(serve(publish(&hits, None)));

        let dir = tempfile::tempdir().unwrap();
        let store = RemoteModelStore::new(format!("{}/v1", url), dir.path().join("model"));

        store.fetch_all().unwrap();
        assert_eq!(hits.count(), 2);
        assert!(store.local.is_populated());
        assert!(!store.local.dir().join(MODEL_CHECKSUM_FILE).exists());
    }

    #[test]
    fn test_remote_missing_model_is_fetch_error() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let url = rt.block_on(serve(Router::new()));

        let dir = tempfile::tempdir().unwrap();
        let store = RemoteModelStore::new(url, dir.path());

        assert!(matches!(store.load(), Err(ModelError::Fetch(_))));
        assert!(!store.local.is_populated());
    }
}
