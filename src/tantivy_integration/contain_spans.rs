//! Containment combinator shared by `SpanWithin` and `SpanContaining`.
//!
//! One side, the *source*, is enumerated and returned; the other side, the *follow*,
//! is advanced only as far as needed to decide whether the current source span
//! takes part in a containment. Both cursors only move forward within a document,
//! which makes a full pass over a document O(m + n).

use tantivy::{DocId, DocSet};

use crate::tantivy_integration::conjunction::SpanConjunction;
use crate::tantivy_integration::spans::{SpanCollector, Spans};
use crate::types::{NextStart, Span, SpanPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainmentKind {
    /// Little spans that are inside a big span. Source is little.
    Within,
    /// Big spans that contain a little span. Source is big.
    Containing,
}

impl ContainmentKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContainmentKind::Within => "SpanWithin",
            ContainmentKind::Containing => "SpanContaining",
        }
    }

    /// Whether the follow span is still behind `source` and must be advanced.
    fn follow_lags(&self, source: Span, follow: Span) -> bool {
        match self {
            ContainmentKind::Within => follow.end < source.end,
            ContainmentKind::Containing => follow.start < source.start,
        }
    }

    /// Evaluated once the follow no longer lags. The lag condition already covers the
    /// other boundary, so together they give `big.start <= little.start` and
    /// `little.end <= big.end`.
    fn accepts(&self, source: Span, follow: Span) -> bool {
        match self {
            ContainmentKind::Within => follow.start <= source.start,
            ContainmentKind::Containing => follow.end <= source.end,
        }
    }

    fn split<'a>(&self, big: &'a mut dyn Spans, little: &'a mut dyn Spans) -> (&'a mut dyn Spans, &'a mut dyn Spans) {
        match self {
            ContainmentKind::Within => (little, big),
            ContainmentKind::Containing => (big, little),
        }
    }
}

pub struct ContainSpans {
    kind: ContainmentKind,
    conjunction: SpanConjunction,
    one_exhausted_in_current_doc: bool,
    at_first_in_current_doc: bool,
}

impl ContainSpans {
    pub fn new(kind: ContainmentKind, conjunction: SpanConjunction) -> Self {
        Self {
            kind,
            conjunction,
            one_exhausted_in_current_doc: false,
            at_first_in_current_doc: false,
        }
    }

    pub fn kind(&self) -> ContainmentKind {
        self.kind
    }

    fn source(&self) -> &dyn Spans {
        match self.kind {
            ContainmentKind::Within => self.conjunction.little(),
            ContainmentKind::Containing => self.conjunction.big(),
        }
    }

    fn reset_doc_state(&mut self) {
        self.one_exhausted_in_current_doc = false;
        self.at_first_in_current_doc = false;
    }

    /// Advances to the next source span that satisfies the containment, leaving both
    /// cursors on the matching pair. Returns `None` and marks the document exhausted
    /// once either side runs out.
    fn next_contained(&mut self) -> Option<Span> {
        let kind = self.kind;
        let (big, little) = self.conjunction.big_and_little_mut();
        let (source, follow) = kind.split(big, little);

        while let NextStart::At(_) = source.next_start_position() {
            let target = source.current_span();
            loop {
                let lags = match follow.position() {
                    SpanPosition::Unstarted => true,
                    SpanPosition::At(span) => kind.follow_lags(target, span),
                    SpanPosition::Exhausted => {
                        self.one_exhausted_in_current_doc = true;
                        return None;
                    }
                };
                if !lags {
                    break;
                }
                if follow.next_start_position().is_exhausted() {
                    self.one_exhausted_in_current_doc = true;
                    return None;
                }
            }
            if kind.accepts(target, follow.current_span()) {
                return Some(target);
            }
        }
        self.one_exhausted_in_current_doc = true;
        None
    }
}

impl DocSet for ContainSpans {
    fn advance(&mut self) -> DocId {
        self.reset_doc_state();
        self.conjunction.advance()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        if self.conjunction.doc() >= target {
            return self.conjunction.doc();
        }
        self.reset_doc_state();
        self.conjunction.seek(target)
    }

    fn doc(&self) -> DocId {
        self.conjunction.doc()
    }

    fn size_hint(&self) -> u32 {
        self.conjunction.size_hint()
    }
}

impl Spans for ContainSpans {
    fn two_phase_current_doc_matches(&mut self) -> bool {
        if !self.conjunction.two_phase_current_doc_matches() {
            return false;
        }
        self.reset_doc_state();
        debug_assert_eq!(self.source().position(), SpanPosition::Unstarted);
        if self.next_contained().is_some() {
            self.at_first_in_current_doc = true;
            true
        } else {
            false
        }
    }

    fn next_start_position(&mut self) -> NextStart {
        if self.at_first_in_current_doc {
            self.at_first_in_current_doc = false;
            return NextStart::At(self.source().current_span().start);
        }
        if self.one_exhausted_in_current_doc {
            return NextStart::Exhausted;
        }
        match self.next_contained() {
            Some(span) => NextStart::At(span.start),
            None => NextStart::Exhausted,
        }
    }

    fn position(&self) -> SpanPosition {
        if self.at_first_in_current_doc {
            SpanPosition::Unstarted
        } else if self.one_exhausted_in_current_doc {
            SpanPosition::Exhausted
        } else {
            self.source().position()
        }
    }

    fn width(&self) -> u32 {
        self.source().width()
    }

    fn collect(&mut self, collector: &mut dyn SpanCollector) {
        let (big, little) = self.conjunction.big_and_little_mut();
        let (source, _) = self.kind.split(big, little);
        source.collect(collector);
    }

    fn positions_cost(&self) -> f32 {
        self.conjunction.positions_cost()
    }
}
