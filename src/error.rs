//! Error types for pipeline assembly, fitting, and transformation.
//!
//! Every violation this crate can detect is raised before the failing
//! operation reaches the execution engine; engine failures pass through
//! unmodified as [`PipelineError::Engine`].

use thiserror::Error;

/// Errors raised by the pipeline layer.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A dynamic `params` argument was neither a param map nor a sequence
    /// of param maps.
    #[error("params must be a param map or a sequence of param maps, but got {found}")]
    InvalidParameterKind { found: String },

    /// A pipeline stage is neither estimator- nor transformer-capable.
    #[error("cannot recognize pipeline stage {index} of kind '{kind}'")]
    UnrecognizedStageType { index: usize, kind: String },

    /// Failure accessing the local pretrained-model cache.
    #[error("failed to access pretrained cache at {path}: {message}")]
    Cache { path: String, message: String },

    /// Failure surfaced by the execution engine, passed through unmodified.
    #[error("engine error: {0}")]
    Engine(String),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
