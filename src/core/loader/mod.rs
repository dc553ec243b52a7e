//! Single-file document loading.
//!
//! [`DocumentLoader`] resolves a file's extension through the shared
//! [`FormatRegistry`] and runs the matching extractor.

pub mod formats;
pub mod registry;

pub use registry::{FormatEntry, FormatRegistry, Loader, LoaderKind, LoaderOptions};

use std::path::Path;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::types::Document;

/// Source identifier recorded for a path
///
/// The same string is used when comparing against sources already in
/// the index, so it must be produced identically everywhere.
pub fn source_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Loads one file into documents using the format registry
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    registry: Arc<FormatRegistry>,
}

impl DocumentLoader {
    pub fn new(registry: Arc<FormatRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Load `path` with the loader registered for its extension
    ///
    /// Fails with `UnsupportedFormat` for unknown extensions and
    /// `LoadError` when the extractor fails. Every returned document
    /// carries `source` set to the path.
    pub fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let entry = self.registry.resolve_path(path)?;
        let mut documents = entry.load(path)?;

        let source = source_string(path);
        for doc in &mut documents {
            doc.metadata
                .entry(crate::core::types::SOURCE_KEY.to_string())
                .or_insert_with(|| serde_json::Value::String(source.clone()));
        }

        tracing::debug!("Loaded {} document(s) from {}", documents.len(), source);
        Ok(documents)
    }
}
