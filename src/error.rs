//! Error types for span queries and span iterators.

use tantivy::{DocId, TantivyError};
use thiserror::Error;

use crate::types::{Span, SpanPosition};

/// Errors raised while building or driving span queries
#[derive(Debug, Error)]
pub enum SpanQueryError {
    #[error("big and little span queries must target the same field (big: field #{big}, little: field #{little})")]
    FieldMismatch { big: u32, little: u32 },

    #[error("field '{0}' is not indexed with positions")]
    PositionsNotIndexed(String),

    #[error("field '{0}' not found in schema")]
    UnknownField(String),

    #[error("span iterator is not positioned on a span: {0:?}")]
    NotPositioned(SpanPosition),

    #[error("document ids must be strictly increasing: {previous} followed by {next}")]
    UnorderedDocs { previous: DocId, next: DocId },

    #[error("spans of document {doc} must have increasing start positions: {previous:?} followed by {next:?}")]
    UnorderedSpans { doc: DocId, previous: Span, next: Span },

    #[error("span {span:?} in document {doc} ends before it starts")]
    InvalidSpan { doc: DocId, span: Span },
}

impl From<SpanQueryError> for TantivyError {
    fn from(err: SpanQueryError) -> Self {
        TantivyError::InvalidArgument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpanQueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_invalid_argument() {
        let err: TantivyError = SpanQueryError::FieldMismatch { big: 0, little: 1 }.into();
        match err {
            TantivyError::InvalidArgument(msg) => assert!(msg.contains("same field")),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }
}
