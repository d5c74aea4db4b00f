pub mod engine;
pub mod error;
pub mod results;
pub mod tantivy_integration;
pub mod types;

pub use engine::{SearchConfig, SpanIndex};
pub use error::SpanQueryError;
pub use results::{SpanDoc, SpanSearchResult};
pub use tantivy_integration::{
    collect_span_matches, ContainSpans, ContainmentKind, SpanCollector, SpanContainQuery, SpanQuery,
    SpanScorer, SpanTermQuery, SpanTopDocsCollector, SpanWeight, Spans, TermPositionCollector, VecSpans,
};
pub use types::{LeafMatch, NextStart, Span, SpanPosition};
