//! Pretrained model resolution and on-disk caching.
//!
//! Resolution maps `(name, language, location?)` to a local artifact
//! directory. The actual fetch is delegated to a [`ModelLocator`]
//! collaborator; this module owns the cache layout: one directory per
//! `name_language` key under the session cache dir, with a JSON metadata
//! sidecar marking a completed fetch. A present artifact is never
//! re-downloaded.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::session::Session;

/// Collaborator that fetches a model artifact into a local directory.
pub trait ModelLocator: Send + Sync {
    fn fetch(
        &self,
        name: &str,
        language: &str,
        location: Option<&str>,
        dest: &Path,
    ) -> PipelineResult<()>;
}

/// Metadata sidecar recorded after a completed fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub name: String,
    pub language: String,
    pub location: Option<String>,
}

const METADATA_FILE: &str = "metadata.json";

/// Caching front of a [`ModelLocator`].
pub struct PretrainedResolver {
    cache_dir: PathBuf,
    locator: Arc<dyn ModelLocator>,
}

impl std::fmt::Debug for PretrainedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PretrainedResolver")
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

impl PretrainedResolver {
    pub fn new(cache_dir: impl Into<PathBuf>, locator: Arc<dyn ModelLocator>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            locator,
        }
    }

    /// Build a resolver over the session's cache directory.
    pub fn for_session(session: &Session, locator: Arc<dyn ModelLocator>) -> Self {
        Self::new(session.cache_dir(), locator)
    }

    /// Resolve a pretrained model to its local artifact directory,
    /// fetching it on first use.
    pub fn resolve(
        &self,
        name: &str,
        language: &str,
        location: Option<&str>,
    ) -> PipelineResult<PathBuf> {
        let key = format!("{}_{}", name, language);
        let artifact_dir = self.cache_dir.join(&key);
        let metadata_path = artifact_dir.join(METADATA_FILE);

        if metadata_path.exists() {
            tracing::debug!(%key, "pretrained cache hit");
            return Ok(artifact_dir);
        }

        tracing::info!(%key, ?location, "pretrained cache miss, fetching");
        fs::create_dir_all(&artifact_dir).map_err(|e| cache_err(&artifact_dir, e))?;
        self.locator.fetch(name, language, location, &artifact_dir)?;

        let metadata = ArtifactMetadata {
            name: name.to_string(),
            language: language.to_string(),
            location: location.map(str::to_string),
        };
        let body = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| PipelineError::Cache {
                path: metadata_path.display().to_string(),
                message: e.to_string(),
            })?;
        // the metadata sidecar is written last: its presence marks a
        // completed fetch
        fs::write(&metadata_path, body).map_err(|e| cache_err(&metadata_path, e))?;
        Ok(artifact_dir)
    }

    /// Read back the metadata sidecar of a cached artifact, if present.
    pub fn metadata(&self, name: &str, language: &str) -> PipelineResult<Option<ArtifactMetadata>> {
        let metadata_path = self
            .cache_dir
            .join(format!("{}_{}", name, language))
            .join(METADATA_FILE);
        if !metadata_path.exists() {
            return Ok(None);
        }
        let body = fs::read(&metadata_path).map_err(|e| cache_err(&metadata_path, e))?;
        let metadata =
            serde_json::from_slice(&body).map_err(|e| PipelineError::Cache {
                path: metadata_path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Some(metadata))
    }
}

fn cache_err(path: &Path, error: std::io::Error) -> PipelineError {
    PipelineError::Cache {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Locator that counts fetches and drops a marker file.
    #[derive(Default)]
    struct CountingLocator {
        fetches: AtomicUsize,
    }

    impl ModelLocator for CountingLocator {
        fn fetch(
            &self,
            name: &str,
            _language: &str,
            _location: Option<&str>,
            dest: &Path,
        ) -> PipelineResult<()> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            fs::write(dest.join("model.bin"), name).map_err(|e| cache_err(dest, e))
        }
    }

    #[test]
    fn fetches_once_then_serves_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let locator = Arc::new(CountingLocator::default());
        let resolver = PretrainedResolver::new(dir.path(), locator.clone());

        let first = resolver.resolve("lemma_antbnc", "en", None).unwrap();
        let second = resolver.resolve("lemma_antbnc", "en", None).unwrap();

        assert_eq!(first, second);
        assert_eq!(locator.fetches.load(Ordering::Relaxed), 1);
        assert!(first.join("model.bin").exists());
    }

    #[test]
    fn distinct_languages_cache_separately() {
        let dir = tempfile::tempdir().unwrap();
        let locator = Arc::new(CountingLocator::default());
        let resolver = PretrainedResolver::new(dir.path(), locator.clone());

        let en = resolver.resolve("lemma_antbnc", "en", None).unwrap();
        let de = resolver.resolve("lemma_antbnc", "de", None).unwrap();

        assert_ne!(en, de);
        assert_eq!(locator.fetches.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn metadata_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let resolver =
            PretrainedResolver::new(dir.path(), Arc::new(CountingLocator::default()));

        assert_eq!(resolver.metadata("ner_dl", "en").unwrap(), None);

        resolver
            .resolve("ner_dl", "en", Some("s3://models/public"))
            .unwrap();
        let metadata = resolver.metadata("ner_dl", "en").unwrap().unwrap();
        assert_eq!(
            metadata,
            ArtifactMetadata {
                name: "ner_dl".into(),
                language: "en".into(),
                location: Some("s3://models/public".into()),
            }
        );
    }
}
