//! Schema for line-oriented text indexes

use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions};

/// Text options that keep term positions, which every span query needs.
pub fn positional_text_options(stored: bool) -> TextOptions {
    let indexing = TextFieldIndexing::default()
        .set_tokenizer("default")
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let options = TextOptions::default().set_indexing_options(indexing);
    if stored {
        options.set_stored()
    } else {
        options
    }
}

/// Schema with a single stored text field indexed with positions.
pub fn build_text_schema(field_name: &str) -> (Schema, Field) {
    let mut builder = Schema::builder();
    let field = builder.add_text_field(field_name, positional_text_options(true));
    log::debug!("Added text field '{}' with positions", field_name);
    (builder.build(), field)
}
