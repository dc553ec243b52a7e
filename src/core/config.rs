//! Configuration management for corpus-ingest.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.
//! The resulting [`Config`] is built once at startup and passed by
//! reference to every component.

use crate::core::error::{IngestError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Where documents come from and how they are loaded
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Root directory scanned for documents
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Glob patterns to exclude from the scan
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Loader workers (0 = one per logical CPU)
    #[serde(default)]
    pub workers: usize,

    /// Log and skip files whose loader fails instead of aborting
    #[serde(default)]
    pub skip_failed_files: bool,
}

/// Chunking and batching configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Characters per chunk (not bytes!)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Character overlap between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks submitted to the store per call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the persistent index
    ///
    /// Unset means the XDG data directory once loaded through
    /// [`Config::load_from`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_dir: Option<PathBuf>,

    /// Collection name (index file stem)
    #[serde(default = "default_collection")]
    pub collection: String,
}

/// Embedding configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding model identifier, one the built-in embedder provides
    #[serde(default = "default_model")]
    pub model: String,

    /// Vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

// Default value functions
fn default_source_dir() -> PathBuf {
    PathBuf::from("source_documents")
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/__pycache__/**".to_string(),
    ]
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_batch_size() -> usize {
    50
}

fn default_persist_dir() -> PathBuf {
    PathBuf::from("./db")
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_model() -> String {
    crate::core::embedding::HashingEmbedder::DEFAULT_MODEL.to_string()
}

fn default_dimensions() -> usize {
    384
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            exclude_patterns: default_exclude_patterns(),
            workers: 0,
            skip_failed_files: false,
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persist_dir: None,
            collection: default_collection(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            dimensions: default_dimensions(),
        }
    }
}

impl StorageConfig {
    /// Configured persist directory, or `./db` when unset
    pub fn persist_dir(&self) -> PathBuf {
        self.persist_dir.clone().unwrap_or_else(default_persist_dir)
    }
}

impl SourceConfig {
    /// Effective worker count
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            IngestError::ConfigError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let config = Self::load_from(None, xdg)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config, preferring an explicitly given file
    ///
    /// File lookup order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. INGEST_CONFIG env var
    /// 3. XDG config file (~/.config/corpus-ingest/config.toml)
    /// 4. ./corpus-ingest.toml
    /// 5. Defaults
    ///
    /// The result is not validated, so callers can layer further
    /// overrides on top before calling [`Config::validate`].
    pub fn load_from(explicit: Option<&Path>, xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            Self::from_file(path)?
        } else if let Ok(config_path) = env::var("INGEST_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("corpus-ingest.toml").exists() {
                Self::from_file("corpus-ingest.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env()?;

        // Index lands in the XDG data dir unless configured elsewhere
        if config.storage.persist_dir.is_none() {
            config.storage.persist_dir = Some(xdg.index_dir());
        }

        Ok(config)
    }

    /// Merge configuration with environment variables
    ///
    /// Unlike unset variables, a variable that is set but does not
    /// parse is a startup error.
    pub fn merge_env(&mut self) -> Result<()> {
        if let Ok(dir) = env::var("SOURCE_DIRECTORY") {
            self.source.source_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("PERSIST_DIRECTORY") {
            self.storage.persist_dir = Some(PathBuf::from(dir));
        }
        if let Ok(model) = env::var("EMBEDDINGS_MODEL_NAME") {
            self.embedding.model = model;
        }

        if let Some(size) = parse_env("INGEST_CHUNK_SIZE")? {
            self.indexing.chunk_size = size;
        }
        if let Some(overlap) = parse_env("INGEST_CHUNK_OVERLAP")? {
            self.indexing.chunk_overlap = overlap;
        }
        if let Some(batch) = parse_env("INGEST_BATCH_SIZE")? {
            self.indexing.batch_size = batch;
        }
        if let Some(workers) = parse_env("INGEST_WORKERS")? {
            self.source.workers = workers;
        }
        if let Some(dims) = parse_env("INGEST_EMBEDDING_DIMENSIONS")? {
            self.embedding.dimensions = dims;
        }
        if let Some(skip) = parse_env("INGEST_SKIP_FAILED")? {
            self.source.skip_failed_files = skip;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.source.source_dir.as_os_str().is_empty() {
            return Err(IngestError::ConfigError(
                "Source directory must be set".to_string(),
            ));
        }

        if self.indexing.chunk_size == 0 {
            return Err(IngestError::ConfigError(
                "Chunk size must be non-zero".to_string(),
            ));
        }

        if self.indexing.chunk_overlap >= self.indexing.chunk_size {
            return Err(IngestError::ConfigError(
                "Chunk overlap must be less than chunk size".to_string(),
            ));
        }

        if self.indexing.batch_size == 0 {
            return Err(IngestError::ConfigError(
                "Batch size must be non-zero".to_string(),
            ));
        }

        if self
            .storage
            .persist_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            return Err(IngestError::ConfigError(
                "Persist directory must be set".to_string(),
            ));
        }

        if self.storage.collection.trim().is_empty() {
            return Err(IngestError::ConfigError(
                "Collection name must not be blank".to_string(),
            ));
        }

        if self.embedding.model.trim().is_empty() {
            return Err(IngestError::ConfigError(
                "Embedding model name must not be blank".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(IngestError::ConfigError(
                "Embedding dimensions must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Source dir: {:?}", self.source.source_dir);
        tracing::info!(
            "  Exclude patterns: {} patterns",
            self.source.exclude_patterns.len()
        );
        tracing::info!("  Workers: {}", self.source.effective_workers());
        tracing::info!("  Skip failed files: {}", self.source.skip_failed_files);
        tracing::info!("  Chunk size: {} chars", self.indexing.chunk_size);
        tracing::info!("  Chunk overlap: {} chars", self.indexing.chunk_overlap);
        tracing::info!("  Batch size: {}", self.indexing.batch_size);
        tracing::info!("  Persist dir: {:?}", self.storage.persist_dir());
        tracing::info!("  Collection: {}", self.storage.collection);
        tracing::info!(
            "  Embedding model: {} ({} dims)",
            self.embedding.model,
            self.embedding.dimensions
        );
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| IngestError::ConfigError(format!("Invalid value for {key}: '{raw}'"))),
        Err(_) => Ok(None),
    }
}
