//! The annotation record produced and consumed by pipeline stages.
//!
//! An [`Annotation`] is a labeled span of text: an annotator type, inclusive
//! begin/end character offsets, the result string, free-form metadata, and an
//! optional embedding vector. Annotations are immutable once created;
//! ordering within a document is positional (begin/end offsets), not
//! guaranteed globally unique.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known annotator type names.
///
/// Stages declare which of these they produce; downstream stages use them to
/// select their input columns.
pub mod annotator_type {
    pub const DOCUMENT: &str = "document";
    pub const TOKEN: &str = "token";
    pub const CHUNK: &str = "chunk";
    pub const POS: &str = "pos";
    pub const WORD_EMBEDDINGS: &str = "word_embeddings";
    pub const SENTENCE_EMBEDDINGS: &str = "sentence_embeddings";
    pub const NAMED_ENTITY: &str = "named_entity";
    pub const ENTITY: &str = "entity";
    pub const DEPENDENCY: &str = "dependency";
    pub const CATEGORY: &str = "category";
    pub const LANGUAGE: &str = "language";
}

/// One labeled span of text.
///
/// The serialized form is a structured column with exactly the field names
/// and types reported by [`Annotation::schema`]; this is the shape exchanged
/// with the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Which annotator type produced this span (see [`annotator_type`]).
    pub annotator_type: String,
    /// Inclusive start character offset.
    pub begin: i32,
    /// Inclusive end character offset.
    pub end: i32,
    /// The annotated result (token text, entity label, lemma, ...).
    pub result: String,
    /// Free-form string metadata.
    pub metadata: BTreeMap<String, String>,
    /// Embedding vector; empty for non-embedding annotators.
    pub embeddings: Vec<f32>,
}

impl Annotation {
    /// Create an annotation with empty metadata and no embeddings.
    pub fn new(
        annotator_type: impl Into<String>,
        begin: i32,
        end: i32,
        result: impl Into<String>,
    ) -> Self {
        Self {
            annotator_type: annotator_type.into(),
            begin,
            end,
            result: result.into(),
            metadata: BTreeMap::new(),
            embeddings: Vec::new(),
        }
    }

    /// Attach a metadata entry, consuming and returning the annotation.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach an embedding vector, consuming and returning the annotation.
    pub fn with_embeddings(mut self, embeddings: Vec<f32>) -> Self {
        self.embeddings = embeddings;
        self
    }

    /// Number of characters covered by the span (offsets are inclusive).
    pub fn span_len(&self) -> usize {
        if self.end < self.begin {
            0
        } else {
            (self.end - self.begin + 1) as usize
        }
    }

    /// The column schema of the serialized annotation, as `(name, type)`
    /// pairs in field order.
    pub fn schema() -> &'static [(&'static str, &'static str)] {
        &[
            ("annotator_type", "string"),
            ("begin", "int32"),
            ("end", "int32"),
            ("result", "string"),
            ("metadata", "map<string,string>"),
            ("embeddings", "array<float32>"),
        ]
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}..{}]: {}",
            self.annotator_type, self.begin, self.end, self.result
        )
    }
}
