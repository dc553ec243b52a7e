//! Core data types for the ingestion pipeline.
//!
//! Documents produced by loaders, chunks produced by the chunker,
//! and the statistics reported at the end of a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata attached to documents and inherited by their chunks
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata key holding the path a document was loaded from
pub const SOURCE_KEY: &str = "source";

/// A raw document extracted from a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text content
    pub text: String,

    /// Source metadata (always contains `source`)
    pub metadata: Metadata,
}

impl Document {
    /// Create a document whose metadata holds only `source`
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(
            SOURCE_KEY.to_string(),
            serde_json::Value::String(source.into()),
        );
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Add a metadata entry
    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// The `source` metadata value, if present
    pub fn source(&self) -> Option<&str> {
        source_of(&self.metadata)
    }
}

/// A bounded-length text fragment, the unit that gets embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The actual text content
    pub text: String,

    /// Metadata copied verbatim from the parent document
    pub metadata: Metadata,

    /// Sequential chunk number within the parent document
    pub chunk_index: usize,
}

impl Chunk {
    /// The `source` metadata value, if present
    pub fn source(&self) -> Option<&str> {
        source_of(&self.metadata)
    }
}

/// Read the `source` entry of a metadata map
pub fn source_of(metadata: &Metadata) -> Option<&str> {
    metadata.get(SOURCE_KEY).and_then(|v| v.as_str())
}

/// How chunks reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    /// Materialize a new index from the first batch
    CreateNew,

    /// Append to an index that already holds documents
    AppendExisting,
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestMode::CreateNew => write!(f, "create"),
            IngestMode::AppendExisting => write!(f, "append"),
        }
    }
}

/// Statistics from a completed ingestion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Mode the run started in
    pub mode: IngestMode,

    /// Candidate files after exclusion
    pub files_scanned: usize,

    /// Files skipped because their loader failed
    pub files_failed: usize,

    /// Raw documents produced by loaders
    pub documents_loaded: usize,

    /// Total chunks created
    pub chunks_created: usize,

    /// Batches submitted to the store
    pub batches_submitted: usize,

    /// Run duration in milliseconds
    pub duration_ms: u64,
}

/// Terminal outcome of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Nothing new under the source directory
    NoNewDocuments,

    /// Chunks were stored and the index persisted
    Completed(IngestStats),
}

impl IngestOutcome {
    /// Stats of a completed run
    pub fn stats(&self) -> Option<&IngestStats> {
        match self {
            IngestOutcome::Completed(stats) => Some(stats),
            IngestOutcome::NoNewDocuments => None,
        }
    }
}
