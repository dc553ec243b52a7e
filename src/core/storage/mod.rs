//! Storage layer for the persistent vector index.
//!
//! The pipeline only sees the [`VectorStore`] trait. The crate ships
//! one implementation, [`LocalVectorStore`], which keeps every record
//! in a single JSON file per collection.
//!
//! # On-disk Structure
//!
//! ```text
//! {persist_dir}/
//! └── {collection}.json    # manifest + records, replaced on persist()
//! ```

mod local;
pub mod sync;

pub use local::{IndexManifest, IndexRecord, LocalVectorStore, SCHEMA_VERSION};

use serde::Serialize;
use std::path::PathBuf;

use crate::core::config::StorageConfig;
use crate::core::error::Result;
use crate::core::types::{Chunk, Metadata};

/// Every stored record, as parallel lists
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Collection {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

/// Where and under which name an index lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub persist_dir: PathBuf,
    pub collection: String,
}

impl StoreSettings {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            persist_dir: config.persist_dir(),
            collection: config.collection.clone(),
        }
    }

    /// Path of the index file
    pub fn index_path(&self) -> PathBuf {
        self.persist_dir.join(format!("{}.json", self.collection))
    }
}

/// A persistent collection of embedded chunks
pub trait VectorStore: Send {
    /// Number of stored records
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// All stored ids, texts and metadata
    fn list_all(&self) -> Result<Collection>;

    /// Replace the collection with `chunks`
    fn create_from_documents(&mut self, chunks: &[Chunk]) -> Result<()>;

    /// Append `chunks`; nothing is added if the call fails
    fn add_documents(&mut self, chunks: &[Chunk]) -> Result<()>;

    /// Flush to durable storage
    fn persist(&mut self) -> Result<()>;
}
