//! Core SpanIndex struct and constructors

use std::path::Path;

use anyhow::{anyhow, Result};
use tantivy::{
    directory::MmapDirectory,
    doc,
    schema::{Field, Schema},
    Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, Term,
};

use crate::engine::config::SearchConfig;
use crate::engine::schema::build_text_schema;
use crate::error::SpanQueryError;
use crate::results::SpanSearchResult;
use crate::tantivy_integration::collector::collect_span_matches;
use crate::tantivy_integration::contain_query::SpanContainQuery;
use crate::tantivy_integration::contain_spans::ContainmentKind;
use crate::tantivy_integration::span_query::SpanQuery;
use crate::tantivy_integration::term_spans::SpanTermQuery;

/// A text index with one positional field, searched with span queries
pub struct SpanIndex {
    pub(crate) index: Index,
    pub(crate) reader: IndexReader,
    pub(crate) field: Field,
    pub(crate) config: SearchConfig,
}

impl SpanIndex {
    /// Create an empty index in memory
    pub fn create_in_ram(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let (schema, _) = build_text_schema(&config.default_field);
        Self::from_index(Index::create_in_ram(schema), config)
    }

    /// Open the index stored in `index_dir`, creating it when the directory is empty
    pub fn open_or_create(index_dir: &Path, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let (schema, _) = build_text_schema(&config.default_field);
        let dir = MmapDirectory::open(index_dir)
            .map_err(|e| anyhow!("Failed to open index directory {}: {}", index_dir.display(), e))?;
        let index = Index::open_or_create(dir, schema)?;
        log::info!("Opened index at {}", index_dir.display());
        Self::from_index(index, config)
    }

    fn from_index(index: Index, config: SearchConfig) -> Result<Self> {
        let field = index
            .schema()
            .get_field(&config.default_field)
            .map_err(|_| SpanQueryError::UnknownField(config.default_field.clone()))?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(Self {
            index,
            reader,
            field,
            config,
        })
    }

    /// Index every line as its own document and commit. Returns the number of documents added.
    pub fn add_lines<I, S>(&self, lines: I) -> Result<u64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut writer: IndexWriter = self
            .index
            .writer_with_num_threads(1, self.config.writer_memory_bytes)?;
        let mut added = 0u64;
        for line in lines {
            writer.add_document(doc!(self.field => line.as_ref()))?;
            added += 1;
        }
        writer.commit()?;
        self.reader.reload()?;
        log::info!("Indexed {} documents", added);
        Ok(added)
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    pub fn schema(&self) -> Schema {
        self.index.schema()
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    /// Span query for one word. The default tokenizer lowercases, so the word is too.
    pub fn term_query(&self, word: &str) -> SpanTermQuery {
        SpanTermQuery::new(Term::from_field_text(self.field, &word.to_lowercase()))
    }

    pub fn contain_query(&self, kind: ContainmentKind, big: &str, little: &str) -> Result<SpanContainQuery> {
        let big = Box::new(self.term_query(big));
        let little = Box::new(self.term_query(little));
        let query = match kind {
            ContainmentKind::Within => SpanContainQuery::within(big, little)?,
            ContainmentKind::Containing => SpanContainQuery::containing(big, little)?,
        };
        Ok(query)
    }

    /// Run a span query with the configured limit and collection options
    pub fn search(&self, query: &dyn SpanQuery) -> Result<SpanSearchResult> {
        let searcher = self.searcher();
        log::debug!(
            "Searching {} over {} documents",
            query.describe(&self.index.schema(), &self.config.default_field),
            searcher.num_docs()
        );
        Ok(collect_span_matches(&searcher, query, &self.config)?)
    }
}
