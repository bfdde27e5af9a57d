//! @ai:module:intent Define annotated training documents and their entity spans
//! @ai:module:layer domain
//! @ai:module:public_api EntitySpan, AnnotatedDocument
//! @ai:module:depends_on label
//! @ai:module:stateless true

use crate::label::Label;
use serde::{Deserialize, Serialize};

/// @ai:intent A labeled half-open byte range within one chunk's text
/// @ai:invariant start < end <= text.len() and both fall on char boundaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: Label,
}

/// @ai:intent A finalized chunk with the spans accumulated for it
/// @ai:invariant spans are ordered by start offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub chunk_index: usize,
    pub text: String,
    pub spans: Vec<EntitySpan>,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize, label: Label) -> Self {
        Self { start, end, label }
    }

    /// @ai:intent Convert byte offsets into character offsets within text
    /// @ai:pre self lies within text on char boundaries
    /// @ai:effects pure
    pub fn char_range(&self, text: &str) -> (usize, usize) {
        let start = text[..self.start].chars().count();
        let len = text[self.start..self.end].chars().count();
        (start, start + len)
    }
}

impl AnnotatedDocument {
    /// @ai:intent Finalize a chunk, ordering spans by start offset
    /// @ai:post spans sorted by (start, end); equal keys keep accumulation order
    /// @ai:effects pure
    pub fn new(chunk_index: usize, text: impl Into<String>, mut spans: Vec<EntitySpan>) -> Self {
        spans.sort_by_key(|span| (span.start, span.end));
        Self {
            chunk_index,
            text: text.into(),
            spans,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// @ai:intent Text covered by a span
    pub fn span_text(&self, span: &EntitySpan) -> &str {
        &self.text[span.start..span.end]
    }
}
