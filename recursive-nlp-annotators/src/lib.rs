#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/recursive-nlp/main/assets/recursive-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/recursive-nlp/issues/"
)]

//! Engine-backed annotator stages for recursive-nlp.
//!
//! Every annotator here is declarative parameter plumbing over an opaque
//! engine handle; none of them contains an algorithm. Each declares its
//! fully-qualified engine identifier and its output annotator type, exposes
//! typed setters for its parameters, and converts into a pipeline
//! [`Stage`](recursive_nlp::Stage).
//!
//! ## Annotators
//!
//! - [`DocumentAssembler`] - Raw text column into `document` annotations
//! - [`RegexTokenizer`] - Pattern-based tokenization
//! - [`Lemmatizer`] - Dictionary-backed lemmatization (recursive estimator)
//! - [`WordEmbeddings`] - Token embedding lookup with storage params
//! - [`NerConverter`] - IOB tags into entity chunks
//! - [`Finisher`] - Annotation columns into plain output columns

mod document_assembler;
mod finisher;
mod lemmatizer;
mod ner_converter;
mod regex_tokenizer;
mod word_embeddings;

#[cfg(test)]
mod tests;

pub use document_assembler::{CleanupMode, DocumentAssembler};
pub use finisher::Finisher;
pub use lemmatizer::Lemmatizer;
pub use ner_converter::NerConverter;
pub use regex_tokenizer::RegexTokenizer;
pub use word_embeddings::WordEmbeddings;
