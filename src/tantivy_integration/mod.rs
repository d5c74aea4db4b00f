pub mod spans;
pub mod memory_spans;
pub mod term_spans;
pub mod conjunction;
pub mod contain_spans;
pub mod span_query;
pub mod contain_query;
pub mod similarity;
pub mod scorer;
pub mod collector;


pub use spans::*;
pub use memory_spans::VecSpans;
pub use term_spans::{SpanTermQuery, TermSpans};
pub use conjunction::SpanConjunction;
pub use contain_spans::{ContainSpans, ContainmentKind};
pub use span_query::{SpanQuery, SpanWeight, SpanWeightAdapter};
pub use contain_query::SpanContainQuery;
pub use similarity::{SpanSimScorer, SpanSimilarity};
pub use scorer::SpanScorer;
pub use collector::*;
