//! Error types and error handling for the ingestion pipeline.
//!
//! Every failure surfaces to the pipeline driver through this one
//! enum. An empty corpus is not an error: it is reported as
//! [`IngestOutcome::NoNewDocuments`](crate::core::types::IngestOutcome).

use std::path::Path;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Main error type for the ingestion pipeline
#[derive(Error, Debug)]
pub enum IngestError {
    /// Extension not in the format registry, or the registered
    /// loader refuses the file
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Text extraction failed for a specific file
    #[error("Failed to load {path}: {message}")]
    LoadError { path: String, message: String },

    /// Storage or embedding backend failure
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Embedder does not accept the requested call shape
    #[error("Embedding interface mismatch: {0}")]
    EmbeddingInterface(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl IngestError {
    /// Build a [`IngestError::LoadError`] for `path`
    pub fn load(path: &Path, message: impl Into<String>) -> Self {
        IngestError::LoadError {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this error concerns a single input file
    ///
    /// These are the errors the scanner may skip when configured to
    /// isolate per-file failures.
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            IngestError::UnsupportedFormat(_) | IngestError::LoadError { .. }
        )
    }
}
