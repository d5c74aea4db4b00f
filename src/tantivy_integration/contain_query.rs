use tantivy::query::{EnableScoring, Query, Weight};
use tantivy::schema::{Field, Schema};
use tantivy::{Result as TantivyResult, Score, SegmentReader, Term};

use crate::error::SpanQueryError;
use crate::tantivy_integration::conjunction::SpanConjunction;
use crate::tantivy_integration::contain_spans::{ContainSpans, ContainmentKind};
use crate::tantivy_integration::similarity::SpanSimilarity;
use crate::tantivy_integration::span_query::{SpanQuery, SpanWeight, SpanWeightAdapter};
use crate::tantivy_integration::spans::Spans;

/// Containment query over two span queries on the same field.
///
/// - [`SpanContainQuery::within`] returns the spans of `little` that lie inside a span of
///   `big`, and takes the boost of `little`.
/// - [`SpanContainQuery::containing`] returns the spans of `big` that contain a span of
///   `little`, and takes the boost of `big`.
#[derive(Debug)]
pub struct SpanContainQuery {
    kind: ContainmentKind,
    big: Box<dyn SpanQuery>,
    little: Box<dyn SpanQuery>,
    boost: Score,
}

impl Clone for SpanContainQuery {
    fn clone(&self) -> Self {
        SpanContainQuery {
            kind: self.kind,
            big: self.big.box_clone_span(),
            little: self.little.box_clone_span(),
            boost: self.boost,
        }
    }
}

impl SpanContainQuery {
    pub fn within(big: Box<dyn SpanQuery>, little: Box<dyn SpanQuery>) -> Result<Self, SpanQueryError> {
        let boost = little.boost();
        Self::new(ContainmentKind::Within, big, little, boost)
    }

    pub fn containing(big: Box<dyn SpanQuery>, little: Box<dyn SpanQuery>) -> Result<Self, SpanQueryError> {
        let boost = big.boost();
        Self::new(ContainmentKind::Containing, big, little, boost)
    }

    fn new(
        kind: ContainmentKind,
        big: Box<dyn SpanQuery>,
        little: Box<dyn SpanQuery>,
        boost: Score,
    ) -> Result<Self, SpanQueryError> {
        if big.field() != little.field() {
            return Err(SpanQueryError::FieldMismatch {
                big: big.field().field_id(),
                little: little.field().field_id(),
            });
        }
        Ok(Self { kind, big, little, boost })
    }

    pub fn kind(&self) -> ContainmentKind {
        self.kind
    }

    pub fn big(&self) -> &dyn SpanQuery {
        self.big.as_ref()
    }

    pub fn little(&self) -> &dyn SpanQuery {
        self.little.as_ref()
    }
}

impl Query for SpanContainQuery {
    fn weight(&self, scoring: EnableScoring<'_>) -> TantivyResult<Box<dyn Weight>> {
        let name = self.describe(scoring.schema(), "");
        Ok(Box::new(SpanWeightAdapter::new(self.kind.name(), name, self.span_weight(scoring)?)))
    }

    fn query_terms<'a>(&'a self, visitor: &mut dyn FnMut(&'a Term, bool)) {
        self.big.query_terms(visitor);
        self.little.query_terms(visitor);
    }
}

impl SpanQuery for SpanContainQuery {
    fn field(&self) -> Field {
        self.big.field()
    }

    fn boost(&self) -> Score {
        self.boost
    }

    fn span_weight(&self, scoring: EnableScoring<'_>) -> TantivyResult<Box<dyn SpanWeight>> {
        // Sub-weights only provide spans; the score comes from this query's similarity.
        let unscored = match &scoring {
            EnableScoring::Enabled { searcher, .. } => EnableScoring::disabled_from_searcher(searcher),
            EnableScoring::Disabled { .. } => scoring.clone(),
        };
        let big = self.big.span_weight(unscored.clone())?;
        let little = self.little.span_weight(unscored)?;

        let mut terms = Vec::new();
        big.extract_terms(&mut terms);
        little.extract_terms(&mut terms);
        let similarity = SpanSimilarity::build(self.field(), &scoring, self.boost, &terms)?;

        Ok(Box::new(SpanContainWeight { kind: self.kind, big, little, similarity }))
    }

    fn describe(&self, schema: &Schema, default_field: &str) -> String {
        let mut out = format!(
            "{}({}, {})",
            self.kind.name(),
            self.big.describe(schema, default_field),
            self.little.describe(schema, default_field)
        );
        if self.boost != 1.0 {
            out.push_str(&format!("^{}", self.boost));
        }
        out
    }

    fn box_clone_span(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

struct SpanContainWeight {
    kind: ContainmentKind,
    big: Box<dyn SpanWeight>,
    little: Box<dyn SpanWeight>,
    similarity: SpanSimilarity,
}

impl SpanWeight for SpanContainWeight {
    fn field(&self) -> Field {
        self.big.field()
    }

    fn spans(&self, reader: &SegmentReader) -> TantivyResult<Option<Box<dyn Spans>>> {
        let big = self.big.spans(reader)?;
        let little = self.little.spans(reader)?;
        let Some(conjunction) = SpanConjunction::prepare(big, little) else {
            log::debug!("{}: one side has no spans in segment {:?}", self.kind.name(), reader.segment_id());
            return Ok(None);
        };
        Ok(Some(Box::new(ContainSpans::new(self.kind, conjunction))))
    }

    fn extract_terms(&self, terms: &mut Vec<Term>) {
        self.big.extract_terms(terms);
        self.little.extract_terms(terms);
    }

    fn similarity(&self) -> &SpanSimilarity {
        &self.similarity
    }
}
