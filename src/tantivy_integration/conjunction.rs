//! Document-level lock-step of a big and a little [`Spans`].
//!
//! The conjunction is the cheap approximation of a containment query: it only
//! guarantees that both sides have postings in the current document.

use tantivy::{DocId, DocSet, TERMINATED};

use crate::tantivy_integration::spans::{seek_forward, Spans};

pub struct SpanConjunction {
    big: Box<dyn Spans>,
    little: Box<dyn Spans>,
}

impl SpanConjunction {
    /// Pairs both sides and aligns them on their first common document.
    ///
    /// Returns `None` when either side has no spans in the segment: the caller must
    /// treat that as "no matches here".
    pub fn prepare(big: Option<Box<dyn Spans>>, little: Option<Box<dyn Spans>>) -> Option<Self> {
        let (big, little) = (big?, little?);
        let mut conjunction = Self { big, little };
        conjunction.align();
        Some(conjunction)
    }

    /// Zig-zag until both sides agree on a document or one runs out.
    fn align(&mut self) -> DocId {
        let mut candidate = self.big.doc();
        loop {
            if candidate == TERMINATED {
                return TERMINATED;
            }
            let little_doc = seek_forward(self.little.as_mut(), candidate);
            if little_doc == candidate {
                return candidate;
            }
            if little_doc == TERMINATED {
                return self.big.seek(TERMINATED);
            }
            candidate = seek_forward(self.big.as_mut(), little_doc);
        }
    }

    pub fn big(&self) -> &dyn Spans {
        self.big.as_ref()
    }

    pub fn little(&self) -> &dyn Spans {
        self.little.as_ref()
    }

    pub(crate) fn big_and_little_mut(&mut self) -> (&mut dyn Spans, &mut dyn Spans) {
        (self.big.as_mut(), self.little.as_mut())
    }

    /// Confirms both sides for the current document, cheaper side first so a failing
    /// cheap side saves decoding the other one.
    pub fn two_phase_current_doc_matches(&mut self) -> bool {
        if self.little.positions_cost() < self.big.positions_cost() {
            self.little.two_phase_current_doc_matches() && self.big.two_phase_current_doc_matches()
        } else {
            self.big.two_phase_current_doc_matches() && self.little.two_phase_current_doc_matches()
        }
    }

    pub fn positions_cost(&self) -> f32 {
        self.big.positions_cost() + self.little.positions_cost()
    }
}

impl DocSet for SpanConjunction {
    fn advance(&mut self) -> DocId {
        if self.big.advance() == TERMINATED {
            return TERMINATED;
        }
        self.align()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        if self.big.doc() >= target {
            return self.big.doc();
        }
        self.big.seek(target);
        self.align()
    }

    fn doc(&self) -> DocId {
        self.big.doc()
    }

    fn size_hint(&self) -> u32 {
        self.big.size_hint().min(self.little.size_hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tantivy_integration::memory_spans::VecSpans;
    use crate::types::Span;

    fn docs(ids: &[DocId]) -> Box<dyn Spans> {
        Box::new(VecSpans::new(ids.iter().map(|&d| (d, vec![Span::new(0, 1)])).collect()).unwrap())
    }

    fn collect_docs(conjunction: &mut SpanConjunction) -> Vec<DocId> {
        let mut out = Vec::new();
        let mut doc = conjunction.doc();
        while doc != TERMINATED {
            out.push(doc);
            doc = conjunction.advance();
        }
        out
    }

    #[test]
    fn test_prepare_none_when_a_side_is_missing() {
        assert!(SpanConjunction::prepare(None, Some(docs(&[1]))).is_none());
        assert!(SpanConjunction::prepare(Some(docs(&[1])), None).is_none());
    }

    #[test]
    fn test_lock_step_intersection() {
        let mut conjunction =
            SpanConjunction::prepare(Some(docs(&[1, 3, 5, 7, 9])), Some(docs(&[2, 3, 4, 9, 12]))).unwrap();
        assert_eq!(collect_docs(&mut conjunction), vec![3, 9]);
    }

    #[test]
    fn test_disjoint_sides_terminate_immediately() {
        let conjunction = SpanConjunction::prepare(Some(docs(&[1, 2])), Some(docs(&[5]))).unwrap();
        assert_eq!(conjunction.doc(), TERMINATED);
    }

    #[test]
    fn test_seek() {
        let mut conjunction =
            SpanConjunction::prepare(Some(docs(&[0, 4, 8, 12])), Some(docs(&[0, 8, 12]))).unwrap();
        assert_eq!(conjunction.doc(), 0);
        assert_eq!(conjunction.seek(5), 8);
        assert_eq!(conjunction.seek(8), 8);
        assert_eq!(conjunction.seek(13), TERMINATED);
    }
}
