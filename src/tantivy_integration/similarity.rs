//! Scoring context shared by all span weights.
//!
//! The similarity is built once per weight from the terms of every leaf involved in the
//! query. The per-document formula is BM25 over the number of span matches, scaled by
//! their average slop factor.

use tantivy::fieldnorm::FieldNormReader;
use tantivy::query::{Bm25Weight, EnableScoring};
use tantivy::schema::Field;
use tantivy::{DocId, Result as TantivyResult, Score, SegmentReader, Term};

#[derive(Clone)]
pub struct SpanSimilarity {
    field: Field,
    bm25: Option<Bm25Weight>,
    boost: Score,
}

impl SpanSimilarity {
    pub fn build(
        field: Field,
        scoring: &EnableScoring<'_>,
        boost: Score,
        terms: &[Term],
    ) -> TantivyResult<Self> {
        let bm25 = match scoring {
            EnableScoring::Enabled { statistics_provider, .. } if !terms.is_empty() => {
                Some(Bm25Weight::for_terms(*statistics_provider, terms)?.boost_by(boost))
            }
            _ => None,
        };
        Ok(Self { field, bm25, boost })
    }

    pub fn is_scoring_enabled(&self) -> bool {
        self.bm25.is_some()
    }

    /// Segment-level scorer. `boost` is the extra boost tantivy passes to `Weight::scorer`.
    pub fn sim_scorer(&self, reader: &SegmentReader, boost: Score) -> TantivyResult<SpanSimScorer> {
        let fieldnorm_reader = match &self.bm25 {
            Some(_) => reader.fieldnorms_readers().get_field(self.field)?,
            None => None,
        }
        .unwrap_or_else(|| FieldNormReader::constant(reader.max_doc(), 1));

        Ok(SpanSimScorer {
            bm25: self.bm25.as_ref().map(|bm25| bm25.boost_by(boost)),
            boost: self.boost * boost,
            fieldnorm_reader,
        })
    }
}

/// Per-segment scorer produced by [`SpanSimilarity::sim_scorer`]
pub struct SpanSimScorer {
    bm25: Option<Bm25Weight>,
    boost: Score,
    fieldnorm_reader: FieldNormReader,
}

impl SpanSimScorer {
    /// Score of `doc` given its number of matches and their summed slop factors.
    pub fn score(&self, doc: DocId, match_count: u32, sloppy_freq: f32) -> Score {
        if match_count == 0 {
            return 0.0;
        }
        match &self.bm25 {
            Some(bm25) => {
                let fieldnorm_id = self.fieldnorm_reader.fieldnorm_id(doc);
                bm25.score(fieldnorm_id, match_count) * sloppy_freq / match_count as f32
            }
            None => self.boost * sloppy_freq,
        }
    }
}
