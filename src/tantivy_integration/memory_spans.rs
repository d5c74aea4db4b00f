//! In-memory span iterator.
//!
//! `VecSpans` replays a fixed list of `(doc, spans)` entries through the [`Spans`]
//! contract. It backs span sources that are already materialized (for example
//! precomputed annotations) and drives the combinator tests without an index.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tantivy::{DocId, DocSet, Term, TERMINATED};

use crate::error::{Result, SpanQueryError};
use crate::tantivy_integration::spans::{SpanCollector, Spans};
use crate::types::{NextStart, Span, SpanPosition};

pub struct VecSpans {
    docs: Vec<(DocId, Vec<Span>)>,
    doc_idx: usize,
    next_span_idx: usize,
    position: SpanPosition,
    term: Option<Term>,
    positions_read: Option<Arc<AtomicUsize>>,
}

impl VecSpans {
    /// Builds the iterator, rejecting entries that break the ordering contract:
    /// doc ids strictly increasing, every span with `start <= end`, starts strictly
    /// increasing and ends non-decreasing within a document. Documents without spans
    /// are dropped.
    pub fn new(docs: Vec<(DocId, Vec<Span>)>) -> Result<Self> {
        let mut previous_doc: Option<DocId> = None;
        for (doc, spans) in &docs {
            if let Some(previous) = previous_doc {
                if *doc <= previous {
                    return Err(SpanQueryError::UnorderedDocs { previous, next: *doc });
                }
            }
            previous_doc = Some(*doc);

            for span in spans {
                if span.start > span.end {
                    return Err(SpanQueryError::InvalidSpan { doc: *doc, span: *span });
                }
            }
            for pair in spans.windows(2) {
                if pair[1].start <= pair[0].start || pair[1].end < pair[0].end {
                    return Err(SpanQueryError::UnorderedSpans {
                        doc: *doc,
                        previous: pair[0],
                        next: pair[1],
                    });
                }
            }
        }

        let docs = docs.into_iter().filter(|(_, spans)| !spans.is_empty()).collect();
        Ok(Self {
            docs,
            doc_idx: 0,
            next_span_idx: 0,
            position: SpanPosition::Unstarted,
            term: None,
            positions_read: None,
        })
    }

    /// Single-document convenience constructor.
    pub fn single_doc(doc: DocId, spans: Vec<Span>) -> Result<Self> {
        Self::new(vec![(doc, spans)])
    }

    /// Term reported to collectors, once per matched span, at the span start.
    pub fn with_term(mut self, term: Term) -> Self {
        self.term = Some(term);
        self
    }

    /// Counts the documents whose positions were read.
    pub fn with_read_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.positions_read = Some(counter);
        self
    }

    fn reset_position(&mut self) {
        self.next_span_idx = 0;
        self.position = SpanPosition::Unstarted;
    }
}

impl DocSet for VecSpans {
    fn advance(&mut self) -> DocId {
        if self.doc_idx < self.docs.len() {
            self.doc_idx += 1;
        }
        self.reset_position();
        self.doc()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        while self.doc_idx < self.docs.len() && self.docs[self.doc_idx].0 < target {
            self.doc_idx += 1;
            self.reset_position();
        }
        self.doc()
    }

    fn doc(&self) -> DocId {
        self.docs.get(self.doc_idx).map(|(doc, _)| *doc).unwrap_or(TERMINATED)
    }

    fn size_hint(&self) -> u32 {
        self.docs.len() as u32
    }
}

impl Spans for VecSpans {
    fn next_start_position(&mut self) -> NextStart {
        let Some((_, spans)) = self.docs.get(self.doc_idx) else {
            self.position = SpanPosition::Exhausted;
            return NextStart::Exhausted;
        };
        if self.next_span_idx == 0 && self.position == SpanPosition::Unstarted {
            if let Some(counter) = &self.positions_read {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
        match spans.get(self.next_span_idx) {
            Some(span) => {
                self.next_span_idx += 1;
                self.position = SpanPosition::At(*span);
                NextStart::At(span.start)
            }
            None => {
                self.position = SpanPosition::Exhausted;
                NextStart::Exhausted
            }
        }
    }

    fn position(&self) -> SpanPosition {
        self.position
    }

    fn width(&self) -> u32 {
        self.position.span().map(|span| span.length().saturating_sub(1)).unwrap_or(0)
    }

    fn collect(&mut self, collector: &mut dyn SpanCollector) {
        if let (Some(term), Some(span)) = (&self.term, self.position.span()) {
            collector.collect_leaf(term, span.start);
        }
    }

    fn positions_cost(&self) -> f32 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pairs: &[(u32, u32)]) -> Vec<Span> {
        pairs.iter().map(|&(s, e)| Span::new(s, e)).collect()
    }

    #[test]
    fn test_positioned_on_first_doc_at_creation() {
        let vs = VecSpans::new(vec![(3, spans(&[(0, 1)])), (8, spans(&[(2, 3)]))]).unwrap();
        assert_eq!(vs.doc(), 3);
        assert_eq!(vs.position(), SpanPosition::Unstarted);
    }

    #[test]
    fn test_enumerates_positions_then_exhausts() {
        let mut vs = VecSpans::single_doc(0, spans(&[(0, 2), (4, 5)])).unwrap();
        assert_eq!(vs.next_start_position(), NextStart::At(0));
        assert_eq!(vs.current_span(), Span::new(0, 2));
        assert_eq!(vs.width(), 1);
        assert_eq!(vs.next_start_position(), NextStart::At(4));
        assert_eq!(vs.next_start_position(), NextStart::Exhausted);
        assert_eq!(vs.next_start_position(), NextStart::Exhausted);
        assert!(vs.checked_span().is_err());
        assert_eq!(vs.advance(), TERMINATED);
    }

    #[test]
    fn test_advance_resets_position() {
        let mut vs = VecSpans::new(vec![(1, spans(&[(5, 6)])), (2, spans(&[(0, 1)]))]).unwrap();
        vs.next_start_position();
        assert_eq!(vs.advance(), 2);
        assert_eq!(vs.position(), SpanPosition::Unstarted);
        assert!(matches!(vs.checked_span(), Err(SpanQueryError::NotPositioned(SpanPosition::Unstarted))));
    }

    #[test]
    fn test_seek() {
        let mut vs = VecSpans::new(vec![
            (1, spans(&[(0, 1)])),
            (4, spans(&[(0, 1)])),
            (9, spans(&[(0, 1)])),
        ])
        .unwrap();
        assert_eq!(vs.seek(4), 4);
        assert_eq!(vs.seek(5), 9);
        assert_eq!(vs.seek(TERMINATED), TERMINATED);
    }

    #[test]
    fn test_rejects_unordered_input() {
        assert!(matches!(
            VecSpans::new(vec![(2, spans(&[(0, 1)])), (2, spans(&[(0, 1)]))]),
            Err(SpanQueryError::UnorderedDocs { previous: 2, next: 2 })
        ));
        assert!(matches!(
            VecSpans::single_doc(0, spans(&[(3, 4), (3, 5)])),
            Err(SpanQueryError::UnorderedSpans { doc: 0, .. })
        ));
        assert!(matches!(
            VecSpans::single_doc(0, spans(&[(3, 10), (4, 5)])),
            Err(SpanQueryError::UnorderedSpans { doc: 0, .. })
        ));
        assert!(matches!(
            VecSpans::single_doc(0, spans(&[(5, 4)])),
            Err(SpanQueryError::InvalidSpan { doc: 0, .. })
        ));
    }

    #[test]
    fn test_empty_docs_are_dropped() {
        let vs = VecSpans::new(vec![(0, Vec::new()), (5, spans(&[(1, 2)]))]).unwrap();
        assert_eq!(vs.doc(), 5);
        let empty = VecSpans::new(Vec::new()).unwrap();
        assert_eq!(empty.doc(), TERMINATED);
    }

    #[test]
    fn test_read_counter_counts_documents_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut vs = VecSpans::new(vec![(0, spans(&[(0, 1), (2, 3)])), (1, spans(&[(0, 1)]))])
            .unwrap()
            .with_read_counter(counter.clone());
        vs.next_start_position();
        vs.next_start_position();
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        vs.advance();
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        vs.next_start_position();
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }
}
