use tantivy::{DocSet, Term};

use crate::error::SpanQueryError;
use crate::types::{LeafMatch, NextStart, Span, SpanPosition, NO_MORE_POSITIONS};

/// Iterates through the start/end positions of matches, document by document.
///
/// The `DocSet` side is the document-level cursor: like any tantivy `DocSet`, a `Spans`
/// is positioned on its first document when created and reports `tantivy::TERMINATED`
/// once exhausted. Within a document, spans are enumerated by increasing start position
/// (end positions never regress). Moving to another document resets the position cursor
/// to [`SpanPosition::Unstarted`].
///
/// Implementations whose document stream is only an approximation (conjunctions) confirm
/// a document with [`Spans::two_phase_current_doc_matches`]. Callers must invoke it once
/// per document, before the first `next_start_position`, and skip the document when it
/// returns `false`.
pub trait Spans: DocSet {
    /// Moves to the next span of the current document.
    /// Keeps returning `Exhausted` once the document has no more spans.
    fn next_start_position(&mut self) -> NextStart;

    fn position(&self) -> SpanPosition;

    /// The span the cursor is on.
    ///
    /// Only valid after `next_start_position` returned `NextStart::At` in the current
    /// document. Debug builds assert this; release builds return a
    /// `NO_MORE_POSITIONS` span. Use [`Spans::checked_span`] to get an error instead.
    fn current_span(&self) -> Span {
        match self.position() {
            SpanPosition::At(span) => span,
            state => {
                debug_assert!(false, "current_span() called while {:?}", state);
                Span::new(NO_MORE_POSITIONS, NO_MORE_POSITIONS)
            }
        }
    }

    fn checked_span(&self) -> Result<Span, SpanQueryError> {
        self.position().span().ok_or(SpanQueryError::NotPositioned(self.position()))
    }

    /// Exact confirmation of the current document. Exact iterators keep the default.
    fn two_phase_current_doc_matches(&mut self) -> bool {
        true
    }

    /// Width of the current match, used for the slop factor. Lower is better.
    fn width(&self) -> u32 {
        0
    }

    /// Reports the leaves of the current match to `collector`.
    fn collect(&mut self, collector: &mut dyn SpanCollector);

    /// Estimated cost of decoding the positions of one document.
    fn positions_cost(&self) -> f32;
}

/// Receives the leaf terms of span matches, once per matched position.
pub trait SpanCollector {
    fn collect_leaf(&mut self, term: &Term, position: u32);

    /// Called before collecting a new document.
    fn reset(&mut self);

    /// Drains the leaves recorded for the current document. Collectors that only
    /// observe leaves keep the default.
    fn take_leaves(&mut self) -> Vec<LeafMatch> {
        Vec::new()
    }
}

/// Collector that records the text and position of every leaf it is given
#[derive(Debug, Default)]
pub struct TermPositionCollector {
    leaves: Vec<LeafMatch>,
}

impl TermPositionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaves(&self) -> &[LeafMatch] {
        &self.leaves
    }
}

impl SpanCollector for TermPositionCollector {
    fn collect_leaf(&mut self, term: &Term, position: u32) {
        let text = term
            .value()
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:?}", term.serialized_value_bytes()));
        self.leaves.push(LeafMatch::new(text, position));
    }

    fn reset(&mut self) {
        self.leaves.clear();
    }

    fn take_leaves(&mut self) -> Vec<LeafMatch> {
        std::mem::take(&mut self.leaves)
    }
}

/// Seeks `docset` to `target` unless it is already there or beyond.
pub(crate) fn seek_forward<D: DocSet + ?Sized>(docset: &mut D, target: tantivy::DocId) -> tantivy::DocId {
    let doc = docset.doc();
    if doc < target {
        docset.seek(target)
    } else {
        doc
    }
}

/// Slop factor of a match: `1 / (1 + width)`.
pub fn slop_factor(width: u32) -> f32 {
    1.0 / (1.0 + width as f32)
}
