use serde::{Deserialize, Serialize};

/// Diagnostic value reported for the position of an exhausted span cursor.
pub const NO_MORE_POSITIONS: u32 = u32::MAX;

/// Represents a span of token positions with start and end positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Span covering the single token at `position`.
    pub fn token(position: u32) -> Self {
        Self { start: position, end: position.saturating_add(1) }
    }

    /// Zero for a span whose end precedes its start.
    pub fn length(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Inclusive on both boundaries: a span contains itself.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

/// Cursor state of a span iterator within its current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanPosition {
    /// `next_start_position` has not been called yet in this document.
    Unstarted,
    At(Span),
    /// No more spans in this document.
    Exhausted,
}

impl SpanPosition {
    pub fn span(&self) -> Option<Span> {
        match self {
            SpanPosition::At(span) => Some(*span),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, SpanPosition::Exhausted)
    }
}

/// Result of advancing a span cursor to its next start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStart {
    At(u32),
    Exhausted,
}

impl NextStart {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, NextStart::Exhausted)
    }
}

/// A term hit recorded while collecting the leaves of a span match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafMatch {
    pub term: String,
    pub position: u32,
}

impl LeafMatch {
    pub fn new(term: String, position: u32) -> Self {
        Self { term, position }
    }
}
