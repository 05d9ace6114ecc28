//! The boundary to the external execution engine.
//!
//! Every stage in this crate is parameter plumbing around an opaque
//! [`EngineHandle`]: the handle does the fitting and transforming, the core
//! pipeline logic only forwards it, never inspects it. Handles are resolved
//! from a fully-qualified stage identifier plus a unique instance id by the
//! [`Engine`] collaborator, which also owns columnar dataset I/O.

use std::path::Path;
use std::sync::Arc;

use crate::error::PipelineResult;
use crate::params::ParamMap;
use crate::pipeline::PipelineModel;

/// Opaque handle to a dataset owned by the execution engine.
///
/// The id is engine-assigned; this crate never looks inside a dataset, it
/// only threads handles between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dataset {
    id: u64,
}

impl Dataset {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dataset#{}", self.id)
    }
}

/// Capability for delegating stage work to the execution engine.
///
/// The recursive entries additionally receive the pipeline context so a
/// stage can reprocess upstream data through the pipeline itself (for
/// example, self-referential resource augmentation at fit time, or
/// whole-pipeline replay against auxiliary data at transform time).
pub trait EngineHandle: Send + Sync {
    /// The fully-qualified identifier this handle was resolved from.
    fn identifier(&self) -> &str;

    /// Fit against a dataset, producing the fitted counterpart handle.
    fn fit(&self, params: &ParamMap, dataset: &Dataset) -> PipelineResult<Arc<dyn EngineHandle>>;

    /// Fit against a dataset plus the pipeline of stages already executed
    /// before this estimator.
    fn recursive_fit(
        &self,
        params: &ParamMap,
        dataset: &Dataset,
        pipeline: &PipelineModel,
    ) -> PipelineResult<Arc<dyn EngineHandle>>;

    /// Transform a dataset.
    fn transform(&self, params: &ParamMap, dataset: &Dataset) -> PipelineResult<Dataset>;

    /// Transform a dataset with access to the rest of the pipeline.
    fn recursive_transform(
        &self,
        params: &ParamMap,
        dataset: &Dataset,
        pipeline: &PipelineModel,
    ) -> PipelineResult<Dataset>;
}

impl std::fmt::Debug for dyn EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("identifier", &self.identifier())
            .finish()
    }
}

/// The execution-engine collaborator.
///
/// Provides named-object resolution (instantiate a stage handle from its
/// fully-qualified identifier and a unique instance id) and columnar
/// dataset read/write. Injected into [`crate::session::Session`] at
/// construction; there is no process-wide engine.
pub trait Engine: Send + Sync {
    /// Instantiate a stage handle by fully-qualified identifier and uid.
    fn resolve(&self, identifier: &str, uid: &str) -> PipelineResult<Arc<dyn EngineHandle>>;

    /// Read a dataset from a columnar file.
    fn read(&self, path: &Path, format: &str) -> PipelineResult<Dataset>;

    /// Write a dataset to a columnar file.
    fn write(&self, dataset: &Dataset, path: &Path, format: &str) -> PipelineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_is_a_plain_id_wrapper() {
        let ds = Dataset::new(7);
        assert_eq!(ds.id(), 7);
        assert_eq!(ds, Dataset::new(7));
        assert_ne!(ds, Dataset::new(8));
        assert_eq!(ds.to_string(), "dataset#7");
    }
}
