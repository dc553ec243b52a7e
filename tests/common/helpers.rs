// Test helper functions

use corpus_ingest::core::config::Config;
use corpus_ingest::core::embedding::{EmbeddingFunction, HashingEmbedder};
use corpus_ingest::core::indexer::{IngestionPipeline, NoProgress};
use corpus_ingest::core::loader::FormatRegistry;
use corpus_ingest::core::storage::{LocalVectorStore, StoreSettings};
use corpus_ingest::core::types::IngestOutcome;
use corpus_ingest::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Temporary persist directory for one test
#[allow(dead_code)] // Used in integration tests
pub struct TestIndex {
    pub dir: TempDir,
}

impl TestIndex {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Index file of the default collection
    #[allow(dead_code)]
    pub fn index_file(&self) -> PathBuf {
        self.dir.path().join("documents.json")
    }
}

/// Default config pointed at temporary directories
#[allow(dead_code)]
pub fn test_config(source_dir: &Path, persist_dir: &Path) -> Config {
    let mut config = Config::default();
    config.source.source_dir = source_dir.to_path_buf();
    config.source.workers = 2;
    config.storage.persist_dir = Some(persist_dir.to_path_buf());
    config.embedding.dimensions = 32;
    config
}

/// Open the local store described by `config`
#[allow(dead_code)]
pub fn open_store(config: &Config) -> Result<LocalVectorStore> {
    let embedder = HashingEmbedder::new(config.embedding.model.clone(), config.embedding.dimensions);
    let embedding = EmbeddingFunction::detect(Arc::new(embedder))?;
    LocalVectorStore::open(StoreSettings::from_config(&config.storage), embedding)
}

/// One full run against the on-disk index, as a separate invocation would
#[allow(dead_code)]
pub async fn ingest(config: &Config) -> Result<IngestOutcome> {
    let store = open_store(config)?;
    let mut pipeline = IngestionPipeline::new(
        config.clone(),
        Arc::new(FormatRegistry::with_defaults()),
        store,
    );
    pipeline.run(&NoProgress).await
}
