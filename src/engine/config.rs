//! Search configuration types

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Smallest budget tantivy accepts for one indexing thread.
pub const MIN_WRITER_MEMORY_BYTES: usize = 15_000_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Field that span queries target and that `describe` prints without a prefix
    pub default_field: String,
    /// Maximum number of hits returned
    pub limit: usize,
    /// Run the span collector hook and report leaf terms with each hit
    pub collect_terms: bool,
    /// Collect segments on the rayon pool
    pub parallel_segments: bool,
    /// Memory budget of the index writer used by the CLI
    pub writer_memory_bytes: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_field: "text".to_string(),
            limit: 10,
            collect_terms: true,
            parallel_segments: false,
            writer_memory_bytes: 50_000_000,
        }
    }
}

impl SearchConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SearchConfig =
            serde_yaml::from_str(yaml).map_err(|e| anyhow!("Invalid search config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }
        let yaml_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        Self::from_yaml_str(&yaml_str).map_err(|e| anyhow!("{} ({})", e, path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_field.is_empty() {
            return Err(anyhow!("default_field must not be empty"));
        }
        if self.limit == 0 {
            return Err(anyhow!("limit must be at least 1"));
        }
        if self.writer_memory_bytes < MIN_WRITER_MEMORY_BYTES {
            return Err(anyhow!(
                "writer_memory_bytes must be at least {} (got {})",
                MIN_WRITER_MEMORY_BYTES,
                self.writer_memory_bytes
            ));
        }
        Ok(())
    }
}
