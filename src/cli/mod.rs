//! CLI adapter for corpus-ingest
//!
//! A single command: every flag is optional, and running with no
//! flags ingests the configured source directory into the configured
//! index. Flags override environment variables, which override the
//! config file.

pub mod output;
pub mod progress;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::embedding::EmbeddingFunction;
use crate::core::indexer::IngestionPipeline;
use crate::core::loader::FormatRegistry;
use crate::core::storage::{LocalVectorStore, StoreSettings};
use crate::core::xdg::XdgDirs;

use output::{colors, IngestResponse};
use progress::ProgressReporter;

/// corpus-ingest - Incremental document ingestion
///
/// Loads new documents from the source directory, splits them into
/// overlapping chunks and appends them to a persistent vector index.
/// Documents already in the index are skipped.
#[derive(Parser, Debug)]
#[command(name = "corpus-ingest")]
#[command(author = "RHOBIMD HEALTH")]
#[command(version)]
#[command(about = "Ingest a document corpus into a vector index", long_about = None)]
pub struct Cli {
    /// Config file (takes precedence over INGEST_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to scan for documents [env: SOURCE_DIRECTORY]
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Directory holding the index [env: PERSIST_DIRECTORY]
    #[arg(long, value_name = "DIR")]
    pub persist_dir: Option<PathBuf>,

    /// Characters per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Chunks submitted to the index per call
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Loader workers (0 = one per CPU)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Skip files that fail to load instead of aborting
    #[arg(long)]
    pub skip_failed: bool,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.source_dir {
            config.source.source_dir = dir.clone();
        }
        if let Some(dir) = &self.persist_dir {
            config.storage.persist_dir = Some(dir.clone());
        }
        if let Some(size) = self.chunk_size {
            config.indexing.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.indexing.chunk_overlap = overlap;
        }
        if let Some(batch) = self.batch_size {
            config.indexing.batch_size = batch;
        }
        if let Some(workers) = self.workers {
            config.source.workers = workers;
        }
        if self.skip_failed {
            config.source.skip_failed_files = true;
        }
    }

    /// Effective configuration: flags > env > file > defaults
    pub fn resolve_config(&self, xdg: &XdgDirs) -> crate::core::error::Result<Config> {
        let mut config = Config::load_from(self.config.as_deref(), xdg)?;
        self.apply_overrides(&mut config);
        // Validated only once every layer is applied
        config.validate()?;
        Ok(config)
    }
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let xdg = XdgDirs::new();
    xdg.log_paths();
    xdg.ensure_dirs_exist()?;

    let config = cli.resolve_config(&xdg)?;
    config.log_config();

    let embedding = EmbeddingFunction::from_config(&config.embedding)?;
    let settings = StoreSettings::from_config(&config.storage);
    let index_path = settings.index_path();
    let store = LocalVectorStore::open(settings, embedding)?;

    let registry = Arc::new(FormatRegistry::with_defaults());
    let source_dir = config.source.source_dir.clone();
    let mut pipeline = IngestionPipeline::new(config, registry, store);

    let interactive = !cli.quiet && cli.format == OutputFormat::Human;
    if interactive {
        eprintln!(
            "Ingesting {} into {}...",
            colors::file_path(&source_dir.display().to_string()),
            colors::file_path(&index_path.display().to_string())
        );
    }

    let progress = ProgressReporter::new(interactive);
    let outcome = pipeline.run(&progress).await?;

    let response = IngestResponse {
        source_dir: source_dir.display().to_string(),
        index_path: index_path.display().to_string(),
        outcome: &outcome,
    };
    output::print_outcome(&response, cli.format)?;

    Ok(())
}
