//! Span query and span weight abstractions.
//!
//! A [`SpanQuery`] is a regular tantivy `Query` that can also build a [`SpanWeight`],
//! the per-search factory of [`Spans`] iterators. Combinators such as
//! `SpanContainQuery` only talk to their sub-queries through these two traits.

use std::fmt;

use tantivy::query::{EnableScoring, Explanation, Query, Scorer, Weight};
use tantivy::schema::{Field, Schema};
use tantivy::{DocId, DocSet, Result as TantivyResult, Score, SegmentReader, TantivyError, Term};

use crate::tantivy_integration::scorer::SpanScorer;
use crate::tantivy_integration::similarity::SpanSimilarity;
use crate::tantivy_integration::spans::Spans;

/// Base trait of span-based queries.
pub trait SpanQuery: Query {
    /// The field matched by this query.
    fn field(&self) -> Field;

    fn boost(&self) -> Score {
        1.0
    }

    /// Builds the span weight. Combinators call this on their sub-queries with
    /// scoring disabled.
    fn span_weight(&self, scoring: EnableScoring<'_>) -> TantivyResult<Box<dyn SpanWeight>>;

    /// Human readable rendering. Terms on `default_field` are printed without their
    /// field name.
    fn describe(&self, schema: &Schema, default_field: &str) -> String;

    fn box_clone_span(&self) -> Box<dyn SpanQuery>;
}

impl Clone for Box<dyn SpanQuery> {
    fn clone(&self) -> Self {
        self.box_clone_span()
    }
}

/// Per-search factory of [`Spans`] over one field.
pub trait SpanWeight: Send + Sync + 'static {
    fn field(&self) -> Field;

    /// Builds the spans of one segment, or `None` when nothing in the segment can match
    /// (term or field absent). `None` is not an error.
    fn spans(&self, reader: &SegmentReader) -> TantivyResult<Option<Box<dyn Spans>>>;

    /// Appends the terms this weight reads positions for.
    fn extract_terms(&self, terms: &mut Vec<Term>);

    fn similarity(&self) -> &SpanSimilarity;

    fn span_scorer(&self, reader: &SegmentReader, boost: Score) -> TantivyResult<Option<SpanScorer>> {
        let Some(spans) = self.spans(reader)? else {
            return Ok(None);
        };
        let sim_scorer = self.similarity().sim_scorer(reader, boost)?;
        Ok(Some(SpanScorer::new(spans, sim_scorer)))
    }
}

/// Exposes a [`SpanWeight`] as a tantivy [`Weight`].
///
/// `label` names the query type in explanations; `name` is the rendered query, used in
/// logs and attached to explanations as context.
pub struct SpanWeightAdapter {
    label: &'static str,
    name: String,
    span_weight: Box<dyn SpanWeight>,
}

impl SpanWeightAdapter {
    pub fn new(label: &'static str, name: impl Into<String>, span_weight: Box<dyn SpanWeight>) -> Self {
        Self {
            label,
            name: name.into(),
            span_weight,
        }
    }
}

impl fmt::Debug for SpanWeightAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanWeightAdapter")
            .field("label", &self.label)
            .field("name", &self.name)
            .finish()
    }
}

impl Weight for SpanWeightAdapter {
    fn scorer(&self, reader: &SegmentReader, boost: Score) -> TantivyResult<Box<dyn Scorer>> {
        match self.span_weight.span_scorer(reader, boost)? {
            Some(scorer) => Ok(Box::new(scorer)),
            None => {
                log::debug!("{}: no spans in segment {:?}", self.name, reader.segment_id());
                Ok(Box::new(tantivy::query::EmptyScorer))
            }
        }
    }

    fn explain(&self, reader: &SegmentReader, doc: DocId) -> TantivyResult<Explanation> {
        let not_matching =
            || TantivyError::InvalidArgument(format!("Document #({}) does not match", doc));
        let mut scorer = self.span_weight.span_scorer(reader, 1.0)?.ok_or_else(not_matching)?;
        if scorer.seek(doc) != doc {
            return Err(not_matching());
        }
        let num_spans = scorer.spans().len();
        let sloppy_freq = scorer.sloppy_freq();
        let mut explanation = Explanation::new(self.label, scorer.score());
        explanation.add_context(self.name.clone());
        explanation.add_detail(Explanation::new("matching spans", num_spans as Score));
        explanation.add_detail(Explanation::new("sloppy frequency", sloppy_freq));
        Ok(explanation)
    }
}
