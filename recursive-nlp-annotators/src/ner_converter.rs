//! IOB tag sequences into entity chunks.

use recursive_nlp::{annotator_type, AnnotatorModel, PipelineResult, Session, Stage};

/// Transformer that merges `named_entity` IOB tags into `chunk` annotations.
#[derive(Debug, Clone)]
pub struct NerConverter {
    inner: AnnotatorModel,
}

impl NerConverter {
    pub const IDENTIFIER: &'static str = "annotators.ner.NerConverter";

    pub fn new(session: &Session) -> PipelineResult<Self> {
        let inner = AnnotatorModel::new(session, Self::IDENTIFIER, annotator_type::CHUNK)?
            .set_input_cols(&[
                annotator_type::DOCUMENT,
                annotator_type::TOKEN,
                annotator_type::NAMED_ENTITY,
            ])
            .set_output_col("ner_chunk");
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

    /// Keep only these entity labels; everything else is dropped.
    pub fn set_white_list(mut self, entities: &[&str]) -> Self {
        self.inner = self.inner.set_param("white_list", entities);
        self
    }

    pub fn set_preserve_position(mut self, preserve: bool) -> Self {
        self.inner = self.inner.set_param("preserve_position", preserve);
        self
    }

    pub fn model(&self) -> &AnnotatorModel {
        &self.inner
    }
}

impl From<NerConverter> for Stage {
    fn from(converter: NerConverter) -> Self {
        Stage::from(converter.inner)
    }
}
