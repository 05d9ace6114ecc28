#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/recursive-nlp/main/assets/recursive-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/recursive-nlp/issues/"
)]

//! Recursive annotation pipeline framework for engine-backed NLP.
//!
//! Annotator stages in this crate are declarative parameter plumbing: each
//! one wraps an opaque handle resolved from an external execution engine,
//! and `fit`/`transform` delegate to that handle. What this crate owns is
//! the sequencing protocol around those handles, in particular the
//! *recursive* pipeline, where a stage's fit or transform can receive the
//! partially-assembled pipeline itself and re-run earlier stages against
//! data it discovers.
//!
//! ## Core Types
//!
//! - [`Annotation`] - A labeled text span with metadata and embeddings
//! - [`ParamMap`] / [`ParamValue`] - Declarative stage parameters
//! - [`AnnotatorModel`] / [`AnnotatorApproach`] - Transformer/estimator wrappers
//! - [`Stage`] - Closed capability variants over a pipeline unit
//! - [`RecursivePipeline`] / [`RecursivePipelineModel`] - The sequencing protocol
//! - [`Session`] - Explicit engine session (no global state)
//! - [`PretrainedResolver`] - `(name, language, location?)` model cache
//!
//! ## Example
//!
//! ```ignore
//! use recursive_nlp::{RecursivePipeline, Session};
//!
//! let session = Session::builder(engine).app_name("my-app").build();
//! let model = RecursivePipeline::new()
//!     .add_stage(document_assembler)
//!     .add_stage(tokenizer)
//!     .add_stage(lemmatizer)
//!     .fit(&dataset)?;
//! ```

mod annotation;
mod annotator;
mod engine;
mod error;
mod params;
mod pipeline;
mod pretrained;
mod session;
pub mod testing;

pub use annotation::{annotator_type, Annotation};
pub use annotator::{AnnotatorApproach, AnnotatorModel, FitResult};
pub use engine::{Dataset, Engine, EngineHandle};
pub use error::{PipelineError, PipelineResult};
pub use params::{names, ExternalResource, ParamMap, ParamValue, ParamsArg, ReadAs};
pub use pipeline::{
    PipelineModel, RecursivePipeline, RecursivePipelineModel, Stage, StageKind, StageSpec,
};
pub use pretrained::{ArtifactMetadata, ModelLocator, PretrainedResolver};
pub use session::{Session, SessionBuilder};
