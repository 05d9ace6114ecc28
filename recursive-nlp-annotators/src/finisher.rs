//! End of the pipeline: annotation columns into plain output columns.

use recursive_nlp::{annotator_type, AnnotatorModel, PipelineResult, Session, Stage};

/// Transformer that flattens annotation columns into plain string columns,
/// the usual last stage before handing data back to the caller.
#[derive(Debug, Clone)]
pub struct Finisher {
    inner: AnnotatorModel,
}

impl Finisher {
    pub const IDENTIFIER: &'static str = "annotators.base.Finisher";

    pub fn new(session: &Session) -> PipelineResult<Self> {
        let inner = AnnotatorModel::new(session, Self::IDENTIFIER, annotator_type::DOCUMENT)?
            .set_param("clean_annotations", true)
            .set_param("include_metadata", false)
            .set_param("output_as_array", true);
        Ok(Self { inner })
    }

    pub fn set_input_cols(mut self, cols: &[&str]) -> Self {
        self.inner = self.inner.set_input_cols(cols);
        self
    }

    /// Names of the finished columns; defaults to `finished_<input>`.
    pub fn set_output_cols(mut self, cols: &[&str]) -> Self {
        self.inner = self.inner.set_param("output_cols", cols);
        self
    }

    pub fn set_value_split_symbol(mut self, symbol: &str) -> Self {
        self.inner = self.inner.set_param("value_split_symbol", symbol);
        self
    }

    pub fn set_annotation_split_symbol(mut self, symbol: &str) -> Self {
        self.inner = self.inner.set_param("annotation_split_symbol", symbol);
        self
    }

    /// Drop the source annotation columns after finishing.
    pub fn set_clean_annotations(mut self, clean: bool) -> Self {
        self.inner = self.inner.set_param("clean_annotations", clean);
        self
    }

    pub fn set_include_metadata(mut self, include: bool) -> Self {
        self.inner = self.inner.set_param("include_metadata", include);
        self
    }

    pub fn set_output_as_array(mut self, as_array: bool) -> Self {
        self.inner = self.inner.set_param("output_as_array", as_array);
        self
    }

    pub fn model(&self) -> &AnnotatorModel {
        &self.inner
    }
}

impl From<Finisher> for Stage {
    fn from(finisher: Finisher) -> Self {
        Stage::from(finisher.inner)
    }
}
