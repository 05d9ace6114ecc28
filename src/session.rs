//! Explicit session construction.
//!
//! The session owns the [`Engine`] collaborator, the configuration map, the
//! pretrained cache directory, and the uid counter used to give every
//! resolved stage a unique instance id. It is passed explicitly into
//! annotator and pipeline construction; there is no process-wide singleton.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::engine::{Engine, EngineHandle};
use crate::error::PipelineResult;

/// An explicit engine session.
pub struct Session {
    app_name: String,
    config: BTreeMap<String, String>,
    cache_dir: PathBuf,
    engine: Arc<dyn Engine>,
    uid_counter: AtomicU64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("app_name", &self.app_name)
            .field("config", &self.config)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

impl Session {
    /// Start building a session around the given engine.
    pub fn builder(engine: Arc<dyn Engine>) -> SessionBuilder {
        SessionBuilder {
            app_name: "recursive-nlp".to_string(),
            config: BTreeMap::new(),
            cache_dir: std::env::temp_dir().join("recursive_nlp_pretrained"),
            engine,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Produce the next unique instance id for a stage identifier.
    ///
    /// Uids look like `RegexTokenizer_3`: the identifier's last segment plus
    /// a session-scoped counter.
    pub fn next_uid(&self, identifier: &str) -> String {
        let suffix = identifier.rsplit('.').next().unwrap_or(identifier);
        let n = self.uid_counter.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", suffix, n)
    }

    /// Resolve a stage handle by fully-qualified identifier, assigning it a
    /// fresh uid.
    pub fn resolve(&self, identifier: &str) -> PipelineResult<(String, Arc<dyn EngineHandle>)> {
        let uid = self.next_uid(identifier);
        let handle = self.engine.resolve(identifier, &uid)?;
        Ok((uid, handle))
    }
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    app_name: String,
    config: BTreeMap<String, String>,
    cache_dir: PathBuf,
    engine: Arc<dyn Engine>,
}

impl SessionBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Set an engine configuration key (serializer, memory, packages, ...).
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Where pretrained model artifacts are cached.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn build(self) -> Session {
        Session {
            app_name: self.app_name,
            config: self.config,
            cache_dir: self.cache_dir,
            engine: self.engine,
            uid_counter: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingEngine;

    #[test]
    fn builder_defaults_and_overrides() {
        let engine = Arc::new(RecordingEngine::new());
        let session = Session::builder(engine)
            .app_name("test-app")
            .config("serializer", "columnar")
            .cache_dir("/tmp/models")
            .build();

        assert_eq!(session.app_name(), "test-app");
        assert_eq!(
            session.config().get("serializer").map(String::as_str),
            Some("columnar")
        );
        assert_eq!(session.cache_dir(), Path::new("/tmp/models"));
    }

    #[test]
    fn uids_are_unique_and_carry_the_identifier_suffix() {
        let engine = Arc::new(RecordingEngine::new());
        let session = Session::builder(engine).build();

        let a = session.next_uid("annotators.token.RegexTokenizer");
        let b = session.next_uid("annotators.token.RegexTokenizer");
        assert!(a.starts_with("RegexTokenizer_"));
        assert!(b.starts_with("RegexTokenizer_"));
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_goes_through_the_engine() {
        let engine = Arc::new(RecordingEngine::new());
        let session = Session::builder(engine.clone()).build();

        let (uid, handle) = session.resolve("annotators.base.DocumentAssembler").unwrap();
        assert!(uid.starts_with("DocumentAssembler_"));
        assert_eq!(handle.identifier(), "annotators.base.DocumentAssembler");
        assert_eq!(engine.resolved_identifiers(), vec![
            "annotators.base.DocumentAssembler".to_string()
        ]);
    }
}
