//! Pattern-based tokenization.

use recursive_nlp::{annotator_type, AnnotatorModel, PipelineResult, Session, Stage};

/// Transformer that splits `document` annotations into `token` annotations
/// by a regex pattern. The matching itself happens engine-side.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    inner: AnnotatorModel,
}

impl RegexTokenizer {
    pub const IDENTIFIER: &'static str = "annotators.token.RegexTokenizer";

    pub fn new(session: &Session) -> PipelineResult<Self> {
        let inner = AnnotatorModel::new(session, Self::IDENTIFIER, annotator_type::TOKEN)?
            .set_input_cols(&[annotator_type::DOCUMENT])
            .set_output_col("token")
            .set_param("pattern", "\\s+");
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

    /// The split pattern (default `\s+`).
    pub fn set_pattern(mut self, pattern: &str) -> Self {
        self.inner = self.inner.set_param("pattern", pattern);
        self
    }

    pub fn set_min_length(mut self, len: i64) -> Self {
        self.inner = self.inner.set_param("min_length", len);
        self
    }

    pub fn set_max_length(mut self, len: i64) -> Self {
        self.inner = self.inner.set_param("max_length", len);
        self
    }

    pub fn set_to_lowercase(mut self, lowercase: bool) -> Self {
        self.inner = self.inner.set_param("to_lowercase", lowercase);
        self
    }

    /// Use a positional mask to keep original character offsets.
    pub fn set_positional_mask(mut self, mask: bool) -> Self {
        self.inner = self.inner.set_param("positional_mask", mask);
        self
    }

    pub fn set_trim_whitespace(mut self, trim: bool) -> Self {
        self.inner = self.inner.set_param("trim_whitespace", trim);
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

impl From<RegexTokenizer> for Stage {
    fn from(tokenizer: RegexTokenizer) -> Self {
        Stage::from(tokenizer.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recursive_nlp::testing::RecordingEngine;
    use std::sync::Arc;

    #[test]
    fn tokenizer_param_plumbing() {
        let session = Session::builder(Arc::new(RecordingEngine::new())).build();
        let tokenizer = RegexTokenizer::new(&session)
            .unwrap()
            .set_pattern("[^a-zA-Z0-9]+")
            .set_to_lowercase(true)
            .set_min_length(2);

        let model = tokenizer.model();
        assert_eq!(model.output_type(), annotator_type::TOKEN);
        assert_eq!(
            model.params().get("pattern").and_then(|v| v.as_str()),
            Some("[^a-zA-Z0-9]+")
        );
        assert_eq!(
            model.params().get("to_lowercase").and_then(|v| v.as_bool()),
            Some(true)
        );
        assert_eq!(
            model.params().get("min_length").and_then(|v| v.as_int()),
            Some(2)
        );
        assert_eq!(
            model.input_cols().map(<[String]>::to_vec),
            Some(vec!["document".to_string()])
        );
    }
}
