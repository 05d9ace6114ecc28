//! Entry point of every pipeline: turns a raw text column into `document`
//! annotations.

use recursive_nlp::{annotator_type, AnnotatorModel, PipelineResult, Session, Stage};

/// How the engine cleans up the raw text before annotating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode {
    Disabled,
    Inplace,
    InplaceFull,
    Shrink,
    ShrinkFull,
    Each,
    EachFull,
    DeleteFull,
}

impl CleanupMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CleanupMode::Disabled => "disabled",
            CleanupMode::Inplace => "inplace",
            CleanupMode::InplaceFull => "inplace_full",
            CleanupMode::Shrink => "shrink",
            CleanupMode::ShrinkFull => "shrink_full",
            CleanupMode::Each => "each",
            CleanupMode::EachFull => "each_full",
            CleanupMode::DeleteFull => "delete_full",
        }
    }
}

/// Transformer that assembles `document` annotations from a raw text column.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    inner: AnnotatorModel,
}

impl DocumentAssembler {
    pub const IDENTIFIER: &'static str = "annotators.base.DocumentAssembler";

    pub fn new(session: &Session) -> PipelineResult<Self> {
        let inner = AnnotatorModel::new(session, Self::IDENTIFIER, annotator_type::DOCUMENT)?
            .set_param("input_col", "text")
            .set_output_col("document");
        Ok(Self { inner })
    }

    /// The raw text column to read from (default `text`).
    pub fn set_input_col(mut self, col: &str) -> Self {
        self.inner = self.inner.set_param("input_col", col);
        self
    }

    pub fn set_output_col(mut self, col: &str) -> Self {
        self.inner = self.inner.set_output_col(col);
        self
    }

    /// Optional column carrying a per-row document id.
    pub fn set_id_col(mut self, col: &str) -> Self {
        self.inner = self.inner.set_param("id_col", col);
        self
    }

    /// Optional column of per-row metadata to attach to the document.
    pub fn set_metadata_col(mut self, col: &str) -> Self {
        self.inner = self.inner.set_param("metadata_col", col);
        self
    }

    pub fn set_cleanup_mode(mut self, mode: CleanupMode) -> Self {
        self.inner = self.inner.set_param("cleanup_mode", mode.as_str());
        self
    }

    pub fn model(&self) -> &AnnotatorModel {
        &self.inner
    }
}

impl From<DocumentAssembler> for Stage {
    fn from(assembler: DocumentAssembler) -> Self {
        Stage::from(assembler.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recursive_nlp::testing::RecordingEngine;
    use recursive_nlp::StageKind;
    use std::sync::Arc;

    fn session() -> Session {
        Session::builder(Arc::new(RecordingEngine::new())).build()
    }

    #[test]
    fn defaults_and_param_plumbing() {
        let session = session();
        let assembler = DocumentAssembler::new(&session)
            .unwrap()
            .set_input_col("raw")
            .set_cleanup_mode(CleanupMode::Shrink);

        let model = assembler.model();
        assert_eq!(model.output_col(), Some("document"));
        assert_eq!(
            model.params().get("input_col").and_then(|v| v.as_str()),
            Some("raw")
        );
        assert_eq!(
            model.params().get("cleanup_mode").and_then(|v| v.as_str()),
            Some("shrink")
        );
        assert!(model.uid().starts_with("DocumentAssembler_"));
    }

    #[test]
    fn converts_into_a_plain_transformer_stage() {
        let session = session();
        let stage = Stage::from(DocumentAssembler::new(&session).unwrap());
        assert_eq!(stage.kind(), StageKind::Transformer);
    }
}
