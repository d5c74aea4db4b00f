//! Two-phase document matcher over a [`Spans`] iterator.

use tantivy::query::Scorer;
use tantivy::{DocId, DocSet, Score, TERMINATED};

use crate::tantivy_integration::similarity::SpanSimScorer;
use crate::tantivy_integration::spans::{slop_factor, SpanCollector, Spans};
use crate::types::{NextStart, Span};

/// Turns a `Spans` into a tantivy `Scorer`.
///
/// The spans' document stream is treated as an approximation: each candidate document
/// is confirmed with `two_phase_current_doc_matches` before it is exposed, so
/// documents the approximation skips are never position-decoded. Matches of the current
/// document are enumerated lazily, at most once, by `spans()` or `score()`.
pub struct SpanScorer {
    spans: Box<dyn Spans>,
    sim_scorer: SpanSimScorer,
    doc: DocId,
    matches: Vec<Span>,
    matches_loaded: bool,
    sloppy_freq: f32,
    collector: Option<Box<dyn SpanCollector + Send>>,
}

impl SpanScorer {
    pub fn new(spans: Box<dyn Spans>, sim_scorer: SpanSimScorer) -> Self {
        let mut scorer = Self {
            spans,
            sim_scorer,
            doc: TERMINATED,
            matches: Vec::new(),
            matches_loaded: false,
            sloppy_freq: 0.0,
            collector: None,
        };
        scorer.confirm_from_current();
        scorer
    }

    /// Installs a hook called once per match with the leaves of the matching spans.
    pub fn with_collector(mut self, collector: Box<dyn SpanCollector + Send>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn collector_mut(&mut self) -> Option<&mut (dyn SpanCollector + Send + 'static)> {
        self.collector.as_deref_mut()
    }

    /// Moves from the current approximate document to the first confirmed one.
    fn confirm_from_current(&mut self) -> DocId {
        self.matches.clear();
        self.matches_loaded = false;
        self.sloppy_freq = 0.0;
        loop {
            let candidate = self.spans.doc();
            if candidate == TERMINATED {
                self.doc = TERMINATED;
                return TERMINATED;
            }
            if self.spans.two_phase_current_doc_matches() {
                log::trace!("span match confirmed in doc {}", candidate);
                self.doc = candidate;
                return candidate;
            }
            self.spans.advance();
        }
    }

    fn load_matches(&mut self) {
        if self.matches_loaded || self.doc == TERMINATED {
            return;
        }
        self.matches_loaded = true;
        if let Some(collector) = self.collector.as_deref_mut() {
            collector.reset();
        }
        while let NextStart::At(_) = self.spans.next_start_position() {
            let span = self.spans.current_span();
            self.sloppy_freq += slop_factor(self.spans.width());
            if let Some(collector) = self.collector.as_deref_mut() {
                self.spans.collect(collector);
            }
            self.matches.push(span);
        }
    }

    /// All matching spans of the current document, in increasing start order.
    pub fn spans(&mut self) -> &[Span] {
        self.load_matches();
        &self.matches
    }

    pub fn sloppy_freq(&mut self) -> f32 {
        self.load_matches();
        self.sloppy_freq
    }
}

impl DocSet for SpanScorer {
    fn advance(&mut self) -> DocId {
        if self.doc == TERMINATED {
            return TERMINATED;
        }
        self.spans.advance();
        self.confirm_from_current()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        if self.doc >= target {
            return self.doc;
        }
        self.spans.seek(target);
        self.confirm_from_current()
    }

    fn doc(&self) -> DocId {
        self.doc
    }

    fn size_hint(&self) -> u32 {
        self.spans.size_hint()
    }
}

impl Scorer for SpanScorer {
    fn score(&mut self) -> Score {
        self.load_matches();
        self.sim_scorer.score(self.doc, self.matches.len() as u32, self.sloppy_freq)
    }
}
