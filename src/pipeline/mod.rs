//! The recursive pipeline-fitting protocol.
//!
//! A [`RecursivePipeline`] is an ordered list of [`Stage`]s. Fitting folds
//! over the list once: transformers advance the running dataset, estimators
//! are fitted and replaced by their models, and recursive estimators
//! additionally receive the pipeline of everything already executed before
//! them. Stages past the last estimator are pure pass-through.
//!
//! Stage capability is a closed tagged variant, matched exhaustively in the
//! folds; there is no runtime type inspection. Dynamic, config-driven stage
//! descriptions go through [`StageSpec`], where an unknown kind fails with
//! `UnrecognizedStageType` before any engine call.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::annotator::{AnnotatorApproach, AnnotatorModel};
use crate::engine::Dataset;
use crate::error::{PipelineError, PipelineResult};
use crate::params::ParamMap;
use crate::session::Session;


/// The four stage capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Transformer,
    Estimator,
    RecursiveEstimator,
    RecursiveTransformer,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Transformer => "transformer",
            StageKind::Estimator => "estimator",
            StageKind::RecursiveEstimator => "recursive_estimator",
            StageKind::RecursiveTransformer => "recursive_transformer",
        }
    }

    /// Look up a dynamic stage-kind name.
    pub fn parse(name: &str) -> Option<StageKind> {
        STAGE_KINDS.get(name).copied()
    }
}

static STAGE_KINDS: Lazy<BTreeMap<&'static str, StageKind>> = Lazy::new(|| {
    let mut kinds = BTreeMap::new();
    kinds.insert("transformer", StageKind::Transformer);
    kinds.insert("estimator", StageKind::Estimator);
    kinds.insert("recursive_estimator", StageKind::RecursiveEstimator);
    kinds.insert("recursive_transformer", StageKind::RecursiveTransformer);
    kinds
});

/// One unit of a pipeline.
#[derive(Debug, Clone)]
pub enum Stage {
    Transformer(AnnotatorModel),
    Estimator(AnnotatorApproach),
    RecursiveEstimator(AnnotatorApproach),
    RecursiveTransformer(AnnotatorModel),
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Transformer(_) => StageKind::Transformer,
            Stage::Estimator(_) => StageKind::Estimator,
            Stage::RecursiveEstimator(_) => StageKind::RecursiveEstimator,
            Stage::RecursiveTransformer(_) => StageKind::RecursiveTransformer,
        }
    }

    pub fn uid(&self) -> &str {
        match self {
            Stage::Transformer(model) | Stage::RecursiveTransformer(model) => model.uid(),
            Stage::Estimator(approach) | Stage::RecursiveEstimator(approach) => approach.uid(),
        }
    }

    pub fn is_estimator(&self) -> bool {
        matches!(self, Stage::Estimator(_) | Stage::RecursiveEstimator(_))
    }

    pub fn is_transformer(&self) -> bool {
        !self.is_estimator()
    }
}

impl From<AnnotatorModel> for Stage {
    fn from(model: AnnotatorModel) -> Self {
        if model.is_recursive() {
            Stage::RecursiveTransformer(model)
        } else {
            Stage::Transformer(model)
        }
    }
}

impl From<AnnotatorApproach> for Stage {
    fn from(approach: AnnotatorApproach) -> Self {
        if approach.is_recursive() {
            Stage::RecursiveEstimator(approach)
        } else {
            Stage::Estimator(approach)
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.uid())
    }
}

/// A dynamic stage description, for config-driven pipeline assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stage-kind name; must resolve via [`StageKind::parse`].
    pub kind: String,
    /// Fully-qualified engine identifier of the stage.
    pub identifier: String,
    /// Output annotator type (defaults to `document`).
    #[serde(default = "default_output_type")]
    pub output_type: String,
    /// Initial parameter values.
    #[serde(default)]
    pub params: ParamMap,
}

fn default_output_type() -> String {
    crate::annotation::annotator_type::DOCUMENT.to_string()
}

/// An unfitted pipeline over an ordered stage list.
#[derive(Debug, Clone, Default)]
pub struct RecursivePipeline {
    stages: Vec<Stage>,
}

impl RecursivePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Append a stage, returning the pipeline for chaining.
    pub fn add_stage(mut self, stage: impl Into<Stage>) -> Self {
        self.stages.push(stage.into());
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Assemble a pipeline from dynamic stage descriptions.
    ///
    /// Fails with `UnrecognizedStageType` (reporting the offending index and
    /// kind) on the first description whose kind is not a known stage
    /// capability, before any handle is resolved.
    pub fn from_specs(session: &Session, specs: &[StageSpec]) -> PipelineResult<Self> {
        for (index, spec) in specs.iter().enumerate() {
            if StageKind::parse(&spec.kind).is_none() {
                return Err(PipelineError::UnrecognizedStageType {
                    index,
                    kind: spec.kind.clone(),
                });
            }
        }

        let mut stages = Vec::with_capacity(specs.len());
        for spec in specs {
            // parse() checked above
            let kind = StageKind::parse(&spec.kind).unwrap_or(StageKind::Transformer);
            let stage = match kind {
                StageKind::Transformer | StageKind::RecursiveTransformer => {
                    let model = AnnotatorModel::new(session, &spec.identifier, &spec.output_type)?
                        .recursive(kind == StageKind::RecursiveTransformer)
                        .with_params(&spec.params);
                    Stage::from(model)
                }
                StageKind::Estimator | StageKind::RecursiveEstimator => {
                    let approach =
                        AnnotatorApproach::new(session, &spec.identifier, &spec.output_type)?
                            .recursive(kind == StageKind::RecursiveEstimator)
                            .with_params(&spec.params);
                    Stage::from(approach)
                }
            };
            stages.push(stage);
        }
        Ok(Self { stages })
    }

    /// Index of the last estimator stage, if any.
    ///
    /// Stages up to and including this index take part in fit-time dataset
    /// propagation; later stages never see fit-time data.
    pub fn last_estimator_index(&self) -> Option<usize> {
        self.stages.iter().rposition(Stage::is_estimator)
    }

    /// Fit the pipeline against a dataset.
    ///
    /// Single sequential fold; the output model's stage list has the same
    /// length and order as the input list, with every estimator replaced by
    /// its fitted model.
    pub fn fit(&self, dataset: &Dataset) -> PipelineResult<PipelineModel> {
        let last_estimator = self.last_estimator_index();
        tracing::debug!(
            stages = self.stages.len(),
            last_estimator = ?last_estimator,
            "fitting recursive pipeline"
        );

        let last = match last_estimator {
            // no estimator: the stage list passes through unchanged
            None => return Ok(PipelineModel::new(self.stages.clone())),
            Some(last) => last,
        };

        let mut fitted: Vec<Stage> = Vec::with_capacity(self.stages.len());
        let mut current = *dataset;
        for (index, stage) in self.stages.iter().enumerate() {
            if index > last {
                // pass-through suffix: never fitted, never sees fit-time data
                fitted.push(stage.clone());
                continue;
            }
            match stage {
                Stage::Transformer(model) | Stage::RecursiveTransformer(model) => {
                    current = model.transform(&current)?;
                    fitted.push(stage.clone());
                }
                Stage::RecursiveEstimator(approach) => {
                    // context: every transformer accumulated so far, not
                    // including this stage
                    let context = PipelineModel::new(fitted.clone());
                    let model = approach.recursive_fit(&current, &context)?;
                    if index < last {
                        current = model.transform(&current)?;
                    }
                    fitted.push(Stage::from(model));
                }
                Stage::Estimator(approach) => {
                    let model = approach.fit(&current)?;
                    if index < last {
                        current = model.transform(&current)?;
                    }
                    fitted.push(Stage::from(model));
                }
            }
        }
        Ok(PipelineModel::new(fitted))
    }
}

/// An ordered list of fitted stages.
///
/// Produced once per [`RecursivePipeline::fit`] call and immutable after
/// construction. Also used as the pipeline-context object handed to
/// recursive fits and transforms.
#[derive(Debug, Clone, Default)]
pub struct PipelineModel {
    stages: Vec<Stage>,
}

impl PipelineModel {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// A model with no stages, the context a recursive estimator at index 0
    /// receives.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Clone the model with the stage at `index` removed.
    pub fn without_stage(&self, index: usize) -> PipelineModel {
        let stages = self
            .stages
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, stage)| stage.clone())
            .collect();
        PipelineModel::new(stages)
    }

    /// Plain sequential transform through every stage.
    ///
    /// Unfitted estimator stages cannot be transformed and fail with
    /// `UnrecognizedStageType`.
    pub fn transform(&self, dataset: &Dataset) -> PipelineResult<Dataset> {
        let mut current = *dataset;
        for (index, stage) in self.stages.iter().enumerate() {
            match stage {
                Stage::Transformer(model) | Stage::RecursiveTransformer(model) => {
                    current = model.transform(&current)?;
                }
                Stage::Estimator(_) | Stage::RecursiveEstimator(_) => {
                    return Err(PipelineError::UnrecognizedStageType {
                        index,
                        kind: stage.kind().as_str().to_string(),
                    });
                }
            }
        }
        Ok(current)
    }
}

impl std::fmt::Display for PipelineModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PipelineModel[")?;
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", stage)?;
        }
        write!(f, "]")
    }
}

/// Transform-time companion of [`RecursivePipeline`].
///
/// Unlike the plain [`PipelineModel::transform`], this fold gives
/// recursive-transform stages access to the whole pipeline minus themselves
/// and skips lazy annotators entirely.
#[derive(Debug, Clone)]
pub struct RecursivePipelineModel {
    model: PipelineModel,
}

impl RecursivePipelineModel {
    pub fn new(model: PipelineModel) -> Self {
        Self { model }
    }

    pub fn stages(&self) -> &[Stage] {
        self.model.stages()
    }

    pub fn into_inner(self) -> PipelineModel {
        self.model
    }

    /// Sequential single-pass transform, branching only on stage capability:
    ///
    /// - recursive transformer: invoked with the full stage list minus
    ///   itself, enabling whole-pipeline replay against auxiliary data;
    /// - lazy annotator: skipped (intentional no-op);
    /// - otherwise: ordinary transform.
    pub fn transform(&self, dataset: &Dataset) -> PipelineResult<Dataset> {
        let mut current = *dataset;
        for (index, stage) in self.model.stages().iter().enumerate() {
            match stage {
                Stage::RecursiveTransformer(model) => {
                    let rest = self.model.without_stage(index);
                    current = model.transform_recursive(&current, &rest)?;
                }
                Stage::Transformer(model) => {
                    if model.is_lazy() {
                        tracing::debug!(uid = %model.uid(), "skipping lazy annotator");
                    } else {
                        current = model.transform(&current)?;
                    }
                }
                Stage::Estimator(_) | Stage::RecursiveEstimator(_) => {
                    return Err(PipelineError::UnrecognizedStageType {
                        index,
                        kind: stage.kind().as_str().to_string(),
                    });
                }
            }
        }
        Ok(current)
    }
}

impl From<PipelineModel> for RecursivePipelineModel {
    fn from(model: PipelineModel) -> Self {
        Self::new(model)
    }
}
