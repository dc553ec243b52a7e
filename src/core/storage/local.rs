//! File-backed vector store.
//!
//! All records live in memory between `open` and `persist`. The
//! index file is only written by `persist`, through a temporary file
//! renamed over the previous one, so a run that fails part way leaves
//! the last persisted index intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::core::embedding::EmbeddingFunction;
use crate::core::error::{IngestError, Result};
use crate::core::storage::{Collection, StoreSettings, VectorStore};
use crate::core::types::{Chunk, Metadata};

/// Current index file schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Index-level metadata stored alongside the records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub schema_version: u32,
    pub collection: String,
    pub model: String,
    pub dimensions: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One embedded chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    manifest: IndexManifest,
    records: Vec<IndexRecord>,
}

/// Vector store persisted as `{persist_dir}/{collection}.json`
#[derive(Debug)]
pub struct LocalVectorStore {
    settings: StoreSettings,
    embedding: EmbeddingFunction,
    manifest: Option<IndexManifest>,
    records: Vec<IndexRecord>,
}

/// Stable id for a chunk: SHA-256 of metadata, chunk index and text
///
/// Every metadata entry is hashed, not only `source`, so rows or pages
/// of one file with equal text keep distinct ids.
pub fn record_id(chunk: &Chunk) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in &chunk.metadata {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.to_string().as_bytes());
        hasher.update([0u8]);
    }
    hasher.update([1u8]);
    hasher.update((chunk.chunk_index as u64).to_le_bytes());
    hasher.update([0u8]);
    hasher.update(chunk.text.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl LocalVectorStore {
    /// Bind to the index described by `settings`
    ///
    /// A missing index file is an empty store. An existing one must
    /// have been built with the same embedding model and dimensions.
    pub fn open(settings: StoreSettings, embedding: EmbeddingFunction) -> Result<Self> {
        let path = settings.index_path();

        let (manifest, records) = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                IngestError::BackendError(format!("Failed to read index {}: {e}", path.display()))
            })?;
            let file: IndexFile = serde_json::from_str(&contents).map_err(|e| {
                IngestError::BackendError(format!("Corrupt index {}: {e}", path.display()))
            })?;

            check_manifest(&file.manifest, &embedding)?;
            tracing::debug!(
                "Opened index {} ({} records)",
                path.display(),
                file.records.len()
            );
            (Some(file.manifest), file.records)
        } else {
            tracing::debug!("No index at {}, starting empty", path.display());
            (None, Vec::new())
        };

        Ok(Self {
            settings,
            embedding,
            manifest,
            records,
        })
    }

    pub fn index_path(&self) -> PathBuf {
        self.settings.index_path()
    }

    pub fn manifest(&self) -> Option<&IndexManifest> {
        self.manifest.as_ref()
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    fn new_manifest(&self) -> IndexManifest {
        let now = Utc::now();
        IndexManifest {
            schema_version: SCHEMA_VERSION,
            collection: self.settings.collection.clone(),
            model: self.embedding.model_name().to_string(),
            dimensions: self.embedding.dimensions(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Insert records, replacing any with the same id in place
    ///
    /// Duplicates inside `records` and against stored records are
    /// treated alike: the last one wins.
    fn upsert(&mut self, records: Vec<IndexRecord>) {
        let mut positions: HashMap<String, usize> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        for record in records {
            match positions.get(&record.id) {
                Some(&i) => self.records[i] = record,
                None => {
                    positions.insert(record.id.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }
    }

    fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<IndexRecord>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedding.embed_documents(&texts)?;

        Ok(chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexRecord {
                id: record_id(chunk),
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                embedding,
            })
            .collect())
    }
}

fn check_manifest(manifest: &IndexManifest, embedding: &EmbeddingFunction) -> Result<()> {
    if manifest.schema_version != SCHEMA_VERSION {
        return Err(IngestError::BackendError(format!(
            "Index '{}' uses schema version {} (current: v{}). Please re-ingest into a new persist directory",
            manifest.collection, manifest.schema_version, SCHEMA_VERSION
        )));
    }

    if manifest.model != embedding.model_name() || manifest.dimensions != embedding.dimensions() {
        return Err(IngestError::BackendError(format!(
            "Index '{}' was built with {} ({} dims) but the configured model is {} ({} dims)",
            manifest.collection,
            manifest.model,
            manifest.dimensions,
            embedding.model_name(),
            embedding.dimensions()
        )));
    }

    Ok(())
}

impl VectorStore for LocalVectorStore {
    fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn list_all(&self) -> Result<Collection> {
        let mut collection = Collection::default();
        for record in &self.records {
            collection.ids.push(record.id.clone());
            collection.documents.push(record.text.clone());
            collection.metadatas.push(record.metadata.clone());
        }
        Ok(collection)
    }

    fn create_from_documents(&mut self, chunks: &[Chunk]) -> Result<()> {
        let records = self.embed_chunks(chunks)?;

        if !self.records.is_empty() {
            tracing::warn!(
                "Replacing {} existing records in '{}'",
                self.records.len(),
                self.settings.collection
            );
        }

        self.manifest = Some(self.new_manifest());
        self.records.clear();
        self.upsert(records);
        Ok(())
    }

    fn add_documents(&mut self, chunks: &[Chunk]) -> Result<()> {
        let records = self.embed_chunks(chunks)?;
        self.upsert(records);

        if self.manifest.is_none() {
            self.manifest = Some(self.new_manifest());
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let mut manifest = match self.manifest.take() {
            Some(manifest) => manifest,
            None => self.new_manifest(),
        };
        manifest.updated_at = Utc::now();

        let file = IndexFile {
            manifest,
            records: std::mem::take(&mut self.records),
        };
        let written = write_index(&self.settings, &file);

        self.manifest = Some(file.manifest);
        self.records = file.records;
        written?;

        tracing::debug!(
            "Persisted {} records to {}",
            self.records.len(),
            self.index_path().display()
        );
        Ok(())
    }
}

fn write_index(settings: &StoreSettings, file: &IndexFile) -> Result<()> {
    let to_backend = |e: std::io::Error| {
        IngestError::BackendError(format!(
            "Failed to write index in {}: {e}",
            settings.persist_dir.display()
        ))
    };

    fs::create_dir_all(&settings.persist_dir).map_err(to_backend)?;

    let path = settings.index_path();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(file)?;
    fs::write(&tmp, json).map_err(to_backend)?;
    fs::rename(&tmp, &path).map_err(to_backend)?;
    Ok(())
}
