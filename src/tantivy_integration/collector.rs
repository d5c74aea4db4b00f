use rayon::prelude::*;
use tantivy::{
    collector::{Collector, SegmentCollector},
    query::{EnableScoring, Scorer},
    DocAddress, DocId, DocSet, Result as TantivyResult, Score, Searcher, SegmentReader, TERMINATED,
};

use crate::engine::SearchConfig;
use crate::results::span_results::TopHits;
use crate::results::{SpanDoc, SpanSearchResult};
use crate::tantivy_integration::scorer::SpanScorer;
use crate::tantivy_integration::span_query::{SpanQuery, SpanWeight};
use crate::tantivy_integration::spans::TermPositionCollector;

/// Top-N collector for span queries run through `Searcher::search`.
///
/// Only documents and scores are visible through the tantivy `Collector` API, so the
/// hits carry no spans. Use [`collect_span_matches`] to get them.
pub struct SpanTopDocsCollector {
    limit: usize,
}

impl SpanTopDocsCollector {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Collector for SpanTopDocsCollector {
    type Fruit = SpanSearchResult;
    type Child = SpanTopDocsSegmentCollector;

    fn for_segment(&self, segment_local_id: u32, _segment: &SegmentReader) -> TantivyResult<Self::Child> {
        Ok(SpanTopDocsSegmentCollector::new(self.limit, segment_local_id))
    }

    fn requires_scoring(&self) -> bool {
        true
    }

    fn merge_fruits(&self, segment_fruits: Vec<Self::Fruit>) -> TantivyResult<Self::Fruit> {
        Ok(SpanSearchResult::merge(segment_fruits, self.limit))
    }
}

pub struct SpanTopDocsSegmentCollector {
    segment_ord: u32,
    top: TopHits,
}

impl SpanTopDocsSegmentCollector {
    pub fn new(limit: usize, segment_ord: u32) -> Self {
        Self {
            segment_ord,
            top: TopHits::new(limit),
        }
    }
}

impl SegmentCollector for SpanTopDocsSegmentCollector {
    type Fruit = SpanSearchResult;

    fn collect(&mut self, doc: DocId, score: Score) {
        let address = DocAddress::new(self.segment_ord, doc);
        if self.top.offer(score, address) {
            self.top.insert(SpanDoc::new(address, score));
        }
    }

    fn harvest(self) -> Self::Fruit {
        self.top.into_result()
    }
}

/// Runs `query` on every segment and returns the best `config.limit` documents with their
/// matching spans.
///
/// With `collect_terms` the leaf terms of every match are reported too. With
/// `parallel_segments` segments are searched on the rayon pool; each scorer still runs on
/// a single thread.
pub fn collect_span_matches(
    searcher: &Searcher,
    query: &dyn SpanQuery,
    config: &SearchConfig,
) -> TantivyResult<SpanSearchResult> {
    let scoring = EnableScoring::Enabled {
        searcher,
        statistics_provider: searcher,
    };
    let weight = query.span_weight(scoring)?;
    let segment_readers = searcher.segment_readers();

    let run = |(segment_ord, reader): (usize, &SegmentReader)| {
        collect_segment(weight.as_ref(), segment_ord as u32, reader, config)
    };
    let fruits: Vec<SpanSearchResult> = if config.parallel_segments {
        segment_readers
            .par_iter()
            .enumerate()
            .map(run)
            .collect::<TantivyResult<_>>()?
    } else {
        segment_readers
            .iter()
            .enumerate()
            .map(run)
            .collect::<TantivyResult<_>>()?
    };

    let result = SpanSearchResult::merge(fruits, config.limit);
    log::debug!(
        "Span search over {} segments: {} hits, {} returned",
        segment_readers.len(),
        result.total_hits,
        result.len()
    );
    Ok(result)
}

fn collect_segment(
    weight: &dyn SpanWeight,
    segment_ord: u32,
    reader: &SegmentReader,
    config: &SearchConfig,
) -> TantivyResult<SpanSearchResult> {
    let Some(scorer) = weight.span_scorer(reader, 1.0)? else {
        return Ok(SpanSearchResult::empty());
    };
    let mut scorer = if config.collect_terms {
        scorer.with_collector(Box::new(TermPositionCollector::new()))
    } else {
        scorer
    };

    let alive = reader.alive_bitset();
    let mut top = TopHits::new(config.limit);

    let mut doc = scorer.doc();
    while doc != TERMINATED {
        if alive.map_or(true, |bitset| bitset.is_alive(doc)) {
            let address = DocAddress::new(segment_ord, doc);
            let score = scorer.score();
            if top.offer(score, address) {
                top.insert(span_doc(&mut scorer, address, score));
            }
        }
        doc = scorer.advance();
    }

    Ok(top.into_result())
}

/// Copies the matches of the current document. Leaves were recorded while scoring loaded them.
fn span_doc(scorer: &mut SpanScorer, address: DocAddress, score: Score) -> SpanDoc {
    let spans = scorer.spans().to_vec();
    let leaves = scorer
        .collector_mut()
        .map(|collector| collector.take_leaves())
        .unwrap_or_default();
    SpanDoc::with_spans(address, score, spans, leaves)
}
