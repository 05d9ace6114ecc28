//! Dictionary-backed lemmatization.
//!
//! The lemmatizer is the canonical recursive estimator: at fit time it
//! receives the pipeline of stages already executed before it, so the
//! engine can push the dictionary resource through that same pipeline and
//! augment it with forms observed in the training data.

use recursive_nlp::{
    annotator_type, AnnotatorApproach, AnnotatorModel, Dataset, ExternalResource, PipelineModel,
    PipelineResult, Session, Stage,
};

/// Recursive estimator that learns a lemma dictionary.
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    inner: AnnotatorApproach,
}

impl Lemmatizer {
    pub const IDENTIFIER: &'static str = "annotators.lemma.Lemmatizer";

    pub fn new(session: &Session) -> PipelineResult<Self> {
        let inner = AnnotatorApproach::new(session, Self::IDENTIFIER, annotator_type::TOKEN)?
            .recursive(true)
            .set_input_cols(&[annotator_type::TOKEN])
            .set_output_col("lemma");
        Ok(Self { inner })
    }

    pub fn set_input_cols(mut self, cols: &[&str]) -> Self {
        self.inner = self.inner.set_input_cols(cols);
        self
    }

    pub fn set_output_col(mut self, col: &str) -> Self {
        self.inner = self.inner.set_output_col(col);
        self
    }

    /// The lemma dictionary resource (`form -> lemma` pairs).
    pub fn set_dictionary(mut self, dictionary: &ExternalResource) -> Self {
        self.inner = self.inner.set_param("dictionary", dictionary.to_param());
        self
    }

    /// Plain fit, without recursive pipeline context.
    pub fn fit(&self, dataset: &Dataset) -> PipelineResult<AnnotatorModel> {
        self.inner.fit(dataset)
    }

    /// Fit with the pipeline of stages executed before this one.
    pub fn recursive_fit(
        &self,
        dataset: &Dataset,
        pipeline: &PipelineModel,
    ) -> PipelineResult<AnnotatorModel> {
        self.inner.recursive_fit(dataset, pipeline)
    }

    pub fn approach(&self) -> &AnnotatorApproach {
        &self.inner
    }
}

impl From<Lemmatizer> for Stage {
    fn from(lemmatizer: Lemmatizer) -> Self {
        Stage::from(lemmatizer.inner)
    }
}
