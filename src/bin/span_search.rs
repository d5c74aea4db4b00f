use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use rustie_spans::{ContainmentKind, SearchConfig, SpanIndex};

#[derive(Parser, Debug)]
#[command(name = "span-search")]
#[command(about = "Run a within/containing span query over a text index")]
#[command(version)]
struct Args {
    /// Search configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Index directory. Without it the index is built in memory
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Text file to index, one document per line
    #[arg(long)]
    input: Option<PathBuf>,

    /// Outer term
    #[arg(long)]
    big: String,

    /// Inner term
    #[arg(long)]
    little: String,

    #[arg(short, long, default_value = "within")]
    mode: Mode,

    /// Overrides `default_field` from the config
    #[arg(short, long)]
    field: Option<String>,

    /// Overrides `limit` from the config
    #[arg(short, long)]
    limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Within,
    Containing,
}

impl From<Mode> for ContainmentKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Within => ContainmentKind::Within,
            Mode::Containing => ContainmentKind::Containing,
        }
    }
}

fn load_config(args: &Args) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_yaml_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(field) = &args.field {
        config.default_field = field.clone();
    }
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = load_config(&args)?;

    let index = match &args.index {
        Some(dir) => {
            fs::create_dir_all(dir)
                .map_err(|e| anyhow!("Failed to create index directory {}: {}", dir.display(), e))?;
            SpanIndex::open_or_create(dir, config)?
        }
        None => SpanIndex::create_in_ram(config)?,
    };

    match &args.input {
        Some(input) => {
            let text = fs::read_to_string(input)
                .map_err(|e| anyhow!("Failed to read input file {}: {}", input.display(), e))?;
            index.add_lines(text.lines().filter(|line| !line.trim().is_empty()))?;
        }
        None if args.index.is_none() => {
            return Err(anyhow!("Nothing to search: pass --input, --index or both"));
        }
        None => {}
    }
    if index.num_docs() == 0 {
        warn!("The index is empty");
    }

    let query = index.contain_query(args.mode.into(), &args.big, &args.little)?;
    let result = index.search(&query)?;
    info!(
        "{} matched {} documents (showing {})",
        rustie_spans::SpanQuery::describe(&query, &index.schema(), &index.config().default_field),
        result.total_hits,
        result.len()
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
