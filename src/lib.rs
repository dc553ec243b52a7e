//! corpus-ingest - Incremental document ingestion into a vector index
//!
//! Scans a directory tree of heterogeneous documents, extracts their
//! text, splits it into overlapping chunks and loads the chunks into
//! a persistent vector index. Reruns only ingest files whose path is
//! not already in the index.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - loader (format registry, extractors)
//!   - indexer (scanner, chunker, batches, pipeline)
//!   - embedding (embedder trait, adapter detection)
//!   - storage (vector store, incremental sync)
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Key Features
//!
//! - Twelve document formats behind one extension registry
//! - Parallel loading on a bounded worker pool
//! - UTF-8 safe recursive chunking (character-based, never panics)
//! - Single atomic persist per run

// Core domain logic
pub mod core;

// CLI adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use crate::core::config::Config;
pub use crate::core::error::{IngestError, Result};
pub use crate::core::indexer::{IngestionPipeline, LoadProgress, NoProgress};
pub use crate::core::loader::FormatRegistry;
pub use crate::core::storage::{LocalVectorStore, StoreSettings, VectorStore};
pub use crate::core::types::*;
