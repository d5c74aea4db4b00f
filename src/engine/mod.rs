//! Index and configuration layer around the span queries
//!
//! - `config`: search configuration loaded from YAML (SearchConfig)
//! - `schema`: positional text schema used by the CLI and the tests
//! - `core`: SpanIndex, a single-field index with span search helpers

pub mod config;
pub mod core;
pub mod schema;

pub use config::SearchConfig;
pub use core::SpanIndex;
pub use schema::{build_text_schema, positional_text_options};
