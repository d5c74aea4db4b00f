pub mod span;

pub use span::{LeafMatch, NextStart, Span, SpanPosition, NO_MORE_POSITIONS};
