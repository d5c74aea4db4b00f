use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tantivy::{DocAddress, Score};

use crate::types::{LeafMatch, Span};

/// A scored document together with its matching spans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanDoc {
    pub doc: DocAddress,
    pub score: Score,
    /// Spans returned by the query, in increasing start order
    pub spans: Vec<Span>,
    /// Leaf terms reported by the span collector hook
    pub leaves: Vec<LeafMatch>,
}

impl SpanDoc {
    pub fn new(doc: DocAddress, score: Score) -> Self {
        Self {
            doc,
            score,
            spans: Vec::new(),
            leaves: Vec::new(),
        }
    }

    pub fn with_spans(doc: DocAddress, score: Score, spans: Vec<Span>, leaves: Vec<LeafMatch>) -> Self {
        Self { doc, score, spans, leaves }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanSearchResult {
    pub total_hits: usize,
    pub hits: Vec<SpanDoc>,
    pub max_score: Option<Score>,
}

impl SpanSearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(total_hits: usize, hits: Vec<SpanDoc>, max_score: Option<Score>) -> Self {
        Self { total_hits, hits, max_score }
    }

    /// Merges per-segment results, keeping the best `limit` hits.
    pub fn merge(fruits: Vec<SpanSearchResult>, limit: usize) -> Self {
        let mut hits = Vec::new();
        let mut total_hits = 0;
        let mut max_score: Option<Score> = None;

        for fruit in fruits {
            total_hits += fruit.total_hits;
            hits.extend(fruit.hits);
            if let Some(score) = fruit.max_score {
                max_score = max_score.map(|s| s.max(score)).or(Some(score));
            }
        }

        sort_and_truncate(&mut hits, limit);
        Self::new(total_hits, hits, max_score)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// Best score first; ties broken by document address so the order is deterministic.
fn rank(a_score: Score, a_doc: DocAddress, b_score: Score, b_doc: DocAddress) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_doc.cmp(&b_doc))
}

pub(crate) fn sort_and_truncate(hits: &mut Vec<SpanDoc>, limit: usize) {
    hits.sort_by(|a, b| rank(a.score, a.doc, b.score, b.doc));
    hits.truncate(limit);
}

/// Heap entry ordered so that the worst hit sits on top.
struct RankedHit(SpanDoc);

impl PartialEq for RankedHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedHit {}

impl PartialOrd for RankedHit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedHit {
    fn cmp(&self, other: &Self) -> Ordering {
        rank(self.0.score, self.0.doc, other.0.score, other.0.doc)
    }
}

/// Keeps the best `limit` hits seen so far, and counts every hit offered.
pub(crate) struct TopHits {
    limit: usize,
    heap: BinaryHeap<RankedHit>,
    total_hits: usize,
    max_score: Option<Score>,
}

impl TopHits {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            heap: BinaryHeap::with_capacity(limit.min(1024)),
            total_hits: 0,
            max_score: None,
        }
    }

    /// Counts a hit and tells whether it would enter the top `limit`. Callers only build
    /// the full `SpanDoc` when it does.
    pub(crate) fn offer(&mut self, score: Score, doc: DocAddress) -> bool {
        self.total_hits += 1;
        self.max_score = self.max_score.map(|s| s.max(score)).or(Some(score));
        if self.limit == 0 {
            return false;
        }
        match self.heap.peek() {
            Some(worst) if self.heap.len() >= self.limit => {
                rank(score, doc, worst.0.score, worst.0.doc) == Ordering::Less
            }
            _ => true,
        }
    }

    /// Inserts a hit previously accepted by [`TopHits::offer`].
    pub(crate) fn insert(&mut self, hit: SpanDoc) {
        if self.heap.len() >= self.limit {
            self.heap.pop();
        }
        self.heap.push(RankedHit(hit));
    }

    pub(crate) fn into_result(self) -> SpanSearchResult {
        let hits = self.heap.into_sorted_vec().into_iter().map(|ranked| ranked.0).collect();
        SpanSearchResult::new(self.total_hits, hits, self.max_score)
    }
}
