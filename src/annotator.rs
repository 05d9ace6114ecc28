//! Estimator- and transformer-side annotator wrappers.
//!
//! An annotator is declarative parameter plumbing around an engine handle:
//! [`AnnotatorApproach`] is the unfitted (estimator) side, [`AnnotatorModel`]
//! the fitted (transformer) side. Neither contains any algorithm; `fit` and
//! `transform` delegate to the handle resolved from the annotator's
//! fully-qualified identifier.
//!
//! Parameter overrides never mutate a stage in place: `with_params` clones
//! the annotator and overlays the new values, so concurrent fan-out fits
//! cannot interfere with each other or with the original stage.

use std::sync::Arc;

use rayon::prelude::*;
use serde_json::Value;

use crate::engine::{Dataset, EngineHandle};
use crate::error::PipelineResult;
use crate::params::{names, ParamMap, ParamValue, ParamsArg};
use crate::pipeline::PipelineModel;
use crate::session::Session;

/// A fitted, transformer-side annotator.
#[derive(Clone)]
pub struct AnnotatorModel {
    uid: String,
    identifier: String,
    output_type: String,
    params: ParamMap,
    handle: Arc<dyn EngineHandle>,
    recursive: bool,
}

impl std::fmt::Debug for AnnotatorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotatorModel")
            .field("uid", &self.uid)
            .field("identifier", &self.identifier)
            .field("output_type", &self.output_type)
            .field("recursive", &self.recursive)
            .finish()
    }
}

impl AnnotatorModel {
    /// Resolve a new transformer-side annotator from the session.
    pub fn new(
        session: &Session,
        identifier: impl Into<String>,
        output_type: impl Into<String>,
    ) -> PipelineResult<Self> {
        let identifier = identifier.into();
        let (uid, handle) = session.resolve(&identifier)?;
        Ok(Self {
            uid,
            identifier,
            output_type: output_type.into(),
            params: ParamMap::new(),
            handle,
            recursive: false,
        })
    }

    /// Wrap a handle produced by an estimator's fit call.
    pub(crate) fn fitted(approach: &AnnotatorApproach, handle: Arc<dyn EngineHandle>) -> Self {
        Self {
            uid: approach.uid.clone(),
            identifier: approach.identifier.clone(),
            output_type: approach.output_type.clone(),
            // the fitted model inherits the approach's parameter values;
            // a recursive estimator yields a recursive-transform-capable model
            params: approach.params.clone(),
            handle,
            recursive: approach.recursive,
        }
    }

    /// Mark this model as recursive-transform capable.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn output_type(&self) -> &str {
        &self.output_type
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Whether this stage is skipped during transform-time pipeline replay.
    pub fn is_lazy(&self) -> bool {
        self.params
            .get(names::LAZY_ANNOTATOR)
            .and_then(ParamValue::as_bool)
            .unwrap_or(false)
    }

    pub fn set_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.set(name, value);
        self
    }

    pub fn set_input_cols(self, cols: &[&str]) -> Self {
        self.set_param(names::INPUT_COLS, cols)
    }

    pub fn set_output_col(self, col: &str) -> Self {
        self.set_param(names::OUTPUT_COL, col)
    }

    pub fn set_lazy_annotator(self, lazy: bool) -> Self {
        self.set_param(names::LAZY_ANNOTATOR, lazy)
    }

    pub fn input_cols(&self) -> Option<&[String]> {
        self.params
            .get(names::INPUT_COLS)
            .and_then(ParamValue::as_str_list)
    }

    pub fn output_col(&self) -> Option<&str> {
        self.params
            .get(names::OUTPUT_COL)
            .and_then(ParamValue::as_str)
    }

    /// Clone this model with `overrides` overlaid on its params. The
    /// original is untouched.
    pub fn with_params(&self, overrides: &ParamMap) -> Self {
        let mut clone = self.clone();
        clone.params = self.params.merged_with(overrides);
        clone
    }

    /// Ordinary transform: delegate dataset and params to the engine.
    pub fn transform(&self, dataset: &Dataset) -> PipelineResult<Dataset> {
        tracing::debug!(uid = %self.uid, %dataset, "transform");
        self.handle.transform(&self.params, dataset)
    }

    /// Recursive transform: the engine additionally receives the pipeline
    /// so this stage can re-run earlier stages against derived data.
    pub fn transform_recursive(
        &self,
        dataset: &Dataset,
        recursive_pipeline: &PipelineModel,
    ) -> PipelineResult<Dataset> {
        tracing::debug!(
            uid = %self.uid,
            pipeline_stages = recursive_pipeline.len(),
            "recursive transform"
        );
        self.handle
            .recursive_transform(&self.params, dataset, recursive_pipeline)
    }

    /// Dynamic-params recursive transform.
    ///
    /// `params` must be a map (or null); a non-empty map runs on a clone so
    /// the original stage is unaffected. Sequences and scalars fail with
    /// `InvalidParameterKind`.
    pub fn transform_recursive_with(
        &self,
        dataset: &Dataset,
        recursive_pipeline: &PipelineModel,
        params: &Value,
    ) -> PipelineResult<Dataset> {
        match ParamsArg::map_from_json(params)? {
            ParamsArg::Current => self.transform_recursive(dataset, recursive_pipeline),
            ParamsArg::Single(map) => self
                .with_params(&map)
                .transform_recursive(dataset, recursive_pipeline),
            // map_from_json never returns Multi
            ParamsArg::Multi(_) => unreachable!("map_from_json rejects sequences"),
        }
    }
}

/// Result of a dynamic-params fit: one model, or one per fanned-out map.
#[derive(Debug, Clone)]
pub enum FitResult {
    Single(AnnotatorModel),
    Multiple(Vec<AnnotatorModel>),
}

impl FitResult {
    pub fn into_single(self) -> Option<AnnotatorModel> {
        match self {
            FitResult::Single(model) => Some(model),
            FitResult::Multiple(_) => None,
        }
    }

    pub fn into_multiple(self) -> Option<Vec<AnnotatorModel>> {
        match self {
            FitResult::Multiple(models) => Some(models),
            FitResult::Single(_) => None,
        }
    }
}

/// An unfitted, estimator-side annotator.
#[derive(Clone)]
pub struct AnnotatorApproach {
    uid: String,
    identifier: String,
    output_type: String,
    params: ParamMap,
    handle: Arc<dyn EngineHandle>,
    recursive: bool,
}

impl std::fmt::Debug for AnnotatorApproach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotatorApproach")
            .field("uid", &self.uid)
            .field("identifier", &self.identifier)
            .field("output_type", &self.output_type)
            .field("recursive", &self.recursive)
            .finish()
    }
}

impl AnnotatorApproach {
    /// Resolve a new estimator-side annotator from the session.
    pub fn new(
        session: &Session,
        identifier: impl Into<String>,
        output_type: impl Into<String>,
    ) -> PipelineResult<Self> {
        let identifier = identifier.into();
        let (uid, handle) = session.resolve(&identifier)?;
        Ok(Self {
            uid,
            identifier,
            output_type: output_type.into(),
            params: ParamMap::new(),
            handle,
            recursive: false,
        })
    }

    /// Mark this estimator as recursive: its fit receives the pipeline of
    /// stages already executed before it.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn output_type(&self) -> &str {
        &self.output_type
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn set_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.set(name, value);
        self
    }

    pub fn set_input_cols(self, cols: &[&str]) -> Self {
        self.set_param(names::INPUT_COLS, cols)
    }

    pub fn set_output_col(self, col: &str) -> Self {
        self.set_param(names::OUTPUT_COL, col)
    }

    pub fn set_training_cols(self, cols: &[&str]) -> Self {
        self.set_param(names::TRAINING_COLS, cols)
    }

    /// Clone this approach with `overrides` overlaid on its params. The
    /// original is untouched.
    pub fn with_params(&self, overrides: &ParamMap) -> Self {
        let mut clone = self.clone();
        clone.params = self.params.merged_with(overrides);
        clone
    }

    /// Plain fit against a dataset.
    pub fn fit(&self, dataset: &Dataset) -> PipelineResult<AnnotatorModel> {
        tracing::debug!(uid = %self.uid, %dataset, "fit");
        let fitted = self.handle.fit(&self.params, dataset)?;
        Ok(AnnotatorModel::fitted(self, fitted))
    }

    /// Recursive fit: the engine receives the accumulated pipeline of every
    /// stage already executed before this estimator.
    pub fn recursive_fit(
        &self,
        dataset: &Dataset,
        pipeline: &PipelineModel,
    ) -> PipelineResult<AnnotatorModel> {
        tracing::debug!(
            uid = %self.uid,
            pipeline_stages = pipeline.len(),
            "recursive fit"
        );
        let fitted = self.handle.recursive_fit(&self.params, dataset, pipeline)?;
        Ok(AnnotatorModel::fitted(self, fitted))
    }

    /// Fit once per param map, in parallel, preserving input order.
    ///
    /// An empty slice returns an empty model sequence.
    pub fn fit_multiple(
        &self,
        dataset: &Dataset,
        param_maps: &[ParamMap],
    ) -> PipelineResult<Vec<AnnotatorModel>> {
        param_maps
            .par_iter()
            .map(|map| self.with_params(map).fit(dataset))
            .collect()
    }

    /// Fit with a pre-parsed dynamic params argument.
    ///
    /// Sequences fan out (plain fits, no pipeline context); a map fits a
    /// single overridden clone; `Current` fits this annotator's own
    /// parameter state, recursively when `pipeline` is present.
    pub fn fit_with(
        &self,
        dataset: &Dataset,
        params: &ParamsArg,
        pipeline: Option<&PipelineModel>,
    ) -> PipelineResult<FitResult> {
        match params {
            ParamsArg::Multi(maps) => Ok(FitResult::Multiple(self.fit_multiple(dataset, maps)?)),
            ParamsArg::Single(map) => self
                .with_params(map)
                .fit_one(dataset, pipeline)
                .map(FitResult::Single),
            ParamsArg::Current => self.fit_one(dataset, pipeline).map(FitResult::Single),
        }
    }

    /// Fit with a loosely-typed JSON params argument.
    ///
    /// Fails with `InvalidParameterKind` when `params` is neither a
    /// sequence nor a map, before any engine call.
    pub fn fit_json(
        &self,
        dataset: &Dataset,
        params: &Value,
        pipeline: Option<&PipelineModel>,
    ) -> PipelineResult<FitResult> {
        let parsed = ParamsArg::from_json(params)?;
        self.fit_with(dataset, &parsed, pipeline)
    }

    fn fit_one(
        &self,
        dataset: &Dataset,
        pipeline: Option<&PipelineModel>,
    ) -> PipelineResult<AnnotatorModel> {
        match pipeline {
            Some(pipeline) => self.recursive_fit(dataset, pipeline),
            None => self.fit(dataset),
        }
    }
}
