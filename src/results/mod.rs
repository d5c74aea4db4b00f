pub mod span_results;

pub use span_results::{SpanDoc, SpanSearchResult};
