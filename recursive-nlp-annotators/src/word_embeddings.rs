//! Token embedding lookup backed by an indexed storage.

use recursive_nlp::{
    annotator_type, names, AnnotatorApproach, AnnotatorModel, Dataset, PipelineResult, Session,
    Stage,
};

/// Estimator that indexes an embeddings file and produces a lookup model.
///
/// Carries the storage parameter group: a `storage_ref` uniquely naming the
/// index so downstream annotators trained against it can find it again.
#[derive(Debug, Clone)]
pub struct WordEmbeddings {
    inner: AnnotatorApproach,
}

impl WordEmbeddings {
    pub const IDENTIFIER: &'static str = "annotators.embeddings.WordEmbeddings";

    pub fn new(session: &Session) -> PipelineResult<Self> {
        let inner =
            AnnotatorApproach::new(session, Self::IDENTIFIER, annotator_type::WORD_EMBEDDINGS)?
                .set_input_cols(&[annotator_type::DOCUMENT, annotator_type::TOKEN])
                .set_output_col("embeddings")
                .set_param(names::CASE_SENSITIVE, false);
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

    /// Number of embedding dimensions.
    pub fn set_dimension(mut self, dimension: i64) -> Self {
        self.inner = self.inner.set_param(names::DIMENSION, dimension);
        self
    }

    pub fn set_case_sensitive(mut self, sensitive: bool) -> Self {
        self.inner = self.inner.set_param(names::CASE_SENSITIVE, sensitive);
        self
    }

    /// Unique reference name for the built index.
    pub fn set_storage_ref(mut self, storage_ref: &str) -> Self {
        self.inner = self.inner.set_param(names::STORAGE_REF, storage_ref);
        self
    }

    pub fn set_storage_path(mut self, path: &str, format: &str) -> Self {
        self.inner = self
            .inner
            .set_param(names::STORAGE_PATH, path)
            .set_param(names::STORAGE_FORMAT, format.to_uppercase());
        self
    }

    /// Whether to save the indexed embeddings along with the model.
    pub fn set_include_storage(mut self, include: bool) -> Self {
        self.inner = self.inner.set_param(names::INCLUDE_STORAGE, include);
        self
    }

    pub fn fit(&self, dataset: &Dataset) -> PipelineResult<AnnotatorModel> {
        self.inner.fit(dataset)
    }

    pub fn approach(&self) -> &AnnotatorApproach {
        &self.inner
    }
}

impl From<WordEmbeddings> for Stage {
    fn from(embeddings: WordEmbeddings) -> Self {
        Stage::from(embeddings.inner)
    }
}
