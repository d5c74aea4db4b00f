use tantivy::postings::{Postings, SegmentPostings};
use tantivy::query::{EnableScoring, Query, Weight};
use tantivy::schema::{Field, IndexRecordOption, Schema};
use tantivy::{DocId, DocSet, Result as TantivyResult, Score, SegmentReader, Term};

use crate::error::SpanQueryError;
use crate::tantivy_integration::similarity::SpanSimilarity;
use crate::tantivy_integration::span_query::{SpanQuery, SpanWeight, SpanWeightAdapter};
use crate::tantivy_integration::spans::{SpanCollector, Spans};
use crate::types::{NextStart, Span, SpanPosition};

/// Relative cost of decoding term positions, compared to reading a doc id.
const TERM_POSITIONS_COST: f32 = 4.0;

/// Spans of a single term, one `(p, p + 1)` span per occurrence.
///
/// Positions are decoded lazily, on the first `next_start_position` of a document.
pub struct TermSpans {
    postings: SegmentPostings,
    term: Term,
    positions: Vec<u32>,
    positions_loaded: bool,
    next_idx: usize,
    position: SpanPosition,
}

impl TermSpans {
    pub fn new(postings: SegmentPostings, term: Term) -> Self {
        Self {
            postings,
            term,
            positions: Vec::with_capacity(16),
            positions_loaded: false,
            next_idx: 0,
            position: SpanPosition::Unstarted,
        }
    }

    fn reset_position(&mut self) {
        self.positions.clear();
        self.positions_loaded = false;
        self.next_idx = 0;
        self.position = SpanPosition::Unstarted;
    }
}

impl DocSet for TermSpans {
    fn advance(&mut self) -> DocId {
        self.reset_position();
        self.postings.advance()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        if self.postings.doc() >= target {
            return self.postings.doc();
        }
        self.reset_position();
        self.postings.seek(target)
    }

    fn doc(&self) -> DocId {
        self.postings.doc()
    }

    fn size_hint(&self) -> u32 {
        self.postings.size_hint()
    }
}

impl Spans for TermSpans {
    fn next_start_position(&mut self) -> NextStart {
        if self.postings.doc() == tantivy::TERMINATED {
            self.position = SpanPosition::Exhausted;
            return NextStart::Exhausted;
        }
        if !self.positions_loaded {
            self.positions.clear();
            self.postings.positions(&mut self.positions);
            self.positions_loaded = true;
        }
        match self.positions.get(self.next_idx) {
            Some(&pos) => {
                self.next_idx += 1;
                self.position = SpanPosition::At(Span::token(pos));
                NextStart::At(pos)
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

    fn collect(&mut self, collector: &mut dyn SpanCollector) {
        if let SpanPosition::At(span) = self.position {
            collector.collect_leaf(&self.term, span.start);
        }
    }

    fn positions_cost(&self) -> f32 {
        TERM_POSITIONS_COST
    }
}

/// Matches the positions of a single term.
#[derive(Clone, Debug)]
pub struct SpanTermQuery {
    term: Term,
    boost: Score,
}

impl SpanTermQuery {
    pub fn new(term: Term) -> Self {
        Self { term, boost: 1.0 }
    }

    pub fn with_boost(mut self, boost: Score) -> Self {
        self.boost = boost;
        self
    }

    pub fn term(&self) -> &Term {
        &self.term
    }
}

impl Query for SpanTermQuery {
    fn weight(&self, scoring: EnableScoring<'_>) -> TantivyResult<Box<dyn Weight>> {
        let name = self.describe(scoring.schema(), "");
        Ok(Box::new(SpanWeightAdapter::new("SpanTerm", name, self.span_weight(scoring)?)))
    }

    fn query_terms<'a>(&'a self, visitor: &mut dyn FnMut(&'a Term, bool)) {
        visitor(&self.term, true);
    }
}

impl SpanQuery for SpanTermQuery {
    fn field(&self) -> Field {
        self.term.field()
    }

    fn boost(&self) -> Score {
        self.boost
    }

    fn span_weight(&self, scoring: EnableScoring<'_>) -> TantivyResult<Box<dyn SpanWeight>> {
        let field = self.term.field();
        let field_entry = scoring.schema().get_field_entry(field);
        let has_positions = field_entry
            .field_type()
            .get_index_record_option()
            .map(|opt| opt.has_positions())
            .unwrap_or(false);
        if !has_positions {
            return Err(SpanQueryError::PositionsNotIndexed(field_entry.name().to_string()).into());
        }

        let similarity =
            SpanSimilarity::build(field, &scoring, self.boost, std::slice::from_ref(&self.term))?;
        Ok(Box::new(SpanTermWeight { term: self.term.clone(), similarity }))
    }

    fn describe(&self, schema: &Schema, default_field: &str) -> String {
        let field_name = schema.get_field_name(self.term.field());
        let text = self
            .term
            .value()
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:?}", self.term.serialized_value_bytes()));
        let mut out = if field_name == default_field {
            text
        } else {
            format!("{}:{}", field_name, text)
        };
        if self.boost != 1.0 {
            out.push_str(&format!("^{}", self.boost));
        }
        out
    }

    fn box_clone_span(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

struct SpanTermWeight {
    term: Term,
    similarity: SpanSimilarity,
}

impl SpanWeight for SpanTermWeight {
    fn field(&self) -> Field {
        self.term.field()
    }

    fn spans(&self, reader: &SegmentReader) -> TantivyResult<Option<Box<dyn Spans>>> {
        let inverted_index = reader.inverted_index(self.term.field())?;
        let Some(postings) =
            inverted_index.read_postings(&self.term, IndexRecordOption::WithFreqsAndPositions)?
        else {
            log::debug!("Term {:?} not present in segment {:?}", self.term, reader.segment_id());
            return Ok(None);
        };
        Ok(Some(Box::new(TermSpans::new(postings, self.term.clone()))))
    }

    fn extract_terms(&self, terms: &mut Vec<Term>) {
        terms.push(self.term.clone());
    }

    fn similarity(&self) -> &SpanSimilarity {
        &self.similarity
    }
}
