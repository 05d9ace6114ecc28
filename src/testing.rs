//! In-memory engine doubles.
//!
//! [`RecordingEngine`] implements the [`Engine`] boundary entirely in
//! memory: every resolve/fit/transform call is appended to a shared log, and
//! each transform mints a fresh dataset id so tests can follow exactly which
//! dataset a stage saw. Failure injection covers the pass-through error
//! path. Used by this crate's own tests and available to downstream crates
//! testing their annotators.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::engine::{Dataset, Engine, EngineHandle};
use crate::error::{PipelineError, PipelineResult};
use crate::params::ParamMap;
use crate::pipeline::PipelineModel;

/// One recorded engine interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Resolve {
        identifier: String,
        uid: String,
    },
    Fit {
        uid: String,
        dataset: u64,
    },
    RecursiveFit {
        uid: String,
        dataset: u64,
        pipeline_stages: usize,
    },
    Transform {
        uid: String,
        dataset: u64,
    },
    RecursiveTransform {
        uid: String,
        dataset: u64,
        pipeline_stages: usize,
    },
    Read {
        path: String,
    },
    Write {
        dataset: u64,
        path: String,
    },
}

#[derive(Debug, Default)]
struct Shared {
    calls: Mutex<Vec<EngineCall>>,
    next_dataset: AtomicU64,
    fail_uids: Mutex<HashSet<String>>,
}

impl Shared {
    fn log(&self, call: EngineCall) {
        self.calls.lock().expect("call log poisoned").push(call);
    }

    fn mint_dataset(&self) -> Dataset {
        Dataset::new(self.next_dataset.fetch_add(1, Ordering::Relaxed))
    }

    fn check_failure(&self, uid: &str) -> PipelineResult<()> {
        let failing = self.fail_uids.lock().expect("fail set poisoned");
        if failing.contains(uid) {
            Err(PipelineError::Engine(format!("injected failure for {}", uid)))
        } else {
            Ok(())
        }
    }
}

/// Call-recording in-memory [`Engine`].
#[derive(Debug, Default)]
pub struct RecordingEngine {
    shared: Arc<Shared>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh input dataset.
    pub fn dataset(&self) -> Dataset {
        self.shared.mint_dataset()
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.shared.calls.lock().expect("call log poisoned").clone()
    }

    /// Make every engine call for the given uid fail.
    pub fn inject_failure(&self, uid: &str) {
        self.shared
            .fail_uids
            .lock()
            .expect("fail set poisoned")
            .insert(uid.to_string());
    }

    /// Identifiers resolved so far, in order.
    pub fn resolved_identifiers(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Resolve { identifier, .. } => Some(identifier),
                _ => None,
            })
            .collect()
    }

    /// Number of fit calls (plain and recursive).
    pub fn fit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    EngineCall::Fit { .. } | EngineCall::RecursiveFit { .. }
                )
            })
            .count()
    }

    /// Number of transform calls (plain and recursive) made by `uid`.
    pub fn transform_count_for(&self, uid: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| match call {
                EngineCall::Transform { uid: u, .. }
                | EngineCall::RecursiveTransform { uid: u, .. } => u == uid,
                _ => false,
            })
            .count()
    }

    /// Pipeline sizes passed to recursive fits, in call order.
    pub fn recursive_fit_contexts(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::RecursiveFit {
                    pipeline_stages, ..
                } => Some(pipeline_stages),
                _ => None,
            })
            .collect()
    }

    /// Pipeline sizes passed to recursive transforms, in call order.
    pub fn recursive_transform_contexts(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::RecursiveTransform {
                    pipeline_stages, ..
                } => Some(pipeline_stages),
                _ => None,
            })
            .collect()
    }
}

impl Engine for RecordingEngine {
    fn resolve(&self, identifier: &str, uid: &str) -> PipelineResult<Arc<dyn EngineHandle>> {
        self.shared.log(EngineCall::Resolve {
            identifier: identifier.to_string(),
            uid: uid.to_string(),
        });
        Ok(Arc::new(RecordingHandle {
            identifier: identifier.to_string(),
            uid: uid.to_string(),
            shared: self.shared.clone(),
        }))
    }

    fn read(&self, path: &Path, _format: &str) -> PipelineResult<Dataset> {
        self.shared.log(EngineCall::Read {
            path: path.display().to_string(),
        });
        Ok(self.shared.mint_dataset())
    }

    fn write(&self, dataset: &Dataset, path: &Path, _format: &str) -> PipelineResult<()> {
        self.shared.log(EngineCall::Write {
            dataset: dataset.id(),
            path: path.display().to_string(),
        });
        Ok(())
    }
}

/// Handle minted by [`RecordingEngine::resolve`].
#[derive(Debug)]
struct RecordingHandle {
    identifier: String,
    uid: String,
    shared: Arc<Shared>,
}

impl EngineHandle for RecordingHandle {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn fit(&self, _params: &ParamMap, dataset: &Dataset) -> PipelineResult<Arc<dyn EngineHandle>> {
        self.shared.check_failure(&self.uid)?;
        self.shared.log(EngineCall::Fit {
            uid: self.uid.clone(),
            dataset: dataset.id(),
        });
        Ok(Arc::new(RecordingHandle {
            identifier: self.identifier.clone(),
            uid: self.uid.clone(),
            shared: self.shared.clone(),
        }))
    }

    fn recursive_fit(
        &self,
        _params: &ParamMap,
        dataset: &Dataset,
        pipeline: &PipelineModel,
    ) -> PipelineResult<Arc<dyn EngineHandle>> {
        self.shared.check_failure(&self.uid)?;
        self.shared.log(EngineCall::RecursiveFit {
            uid: self.uid.clone(),
            dataset: dataset.id(),
            pipeline_stages: pipeline.len(),
        });
        Ok(Arc::new(RecordingHandle {
            identifier: self.identifier.clone(),
            uid: self.uid.clone(),
            shared: self.shared.clone(),
        }))
    }

    fn transform(&self, _params: &ParamMap, dataset: &Dataset) -> PipelineResult<Dataset> {
        self.shared.check_failure(&self.uid)?;
        self.shared.log(EngineCall::Transform {
            uid: self.uid.clone(),
            dataset: dataset.id(),
        });
        Ok(self.shared.mint_dataset())
    }

    fn recursive_transform(
        &self,
        _params: &ParamMap,
        dataset: &Dataset,
        pipeline: &PipelineModel,
    ) -> PipelineResult<Dataset> {
        self.shared.check_failure(&self.uid)?;
        self.shared.log(EngineCall::RecursiveTransform {
            uid: self.uid.clone(),
            dataset: dataset.id(),
            pipeline_stages: pipeline.len(),
        });
        Ok(self.shared.mint_dataset())
    }
}
