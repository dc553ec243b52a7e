//! Core ingestion logic (interface-agnostic)
//!
//! Everything here is independent of the command-line adapter.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Documents, chunks and run statistics
//! - **xdg**: XDG directory handling
//! - **loader**: Format registry and per-format text extraction
//! - **indexer**: Scanning, chunking, batching and the pipeline driver
//! - **embedding**: Embedding capability and adapter detection
//! - **storage**: Vector store trait, local store, index sync

pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod loader;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{IngestError, Result};
