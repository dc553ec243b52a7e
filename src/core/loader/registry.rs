//! Extension to loader mapping.
//!
//! The registry is built once at startup and shared immutably
//! between loader workers.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::core::error::{IngestError, Result};
use crate::core::loader::formats;
use crate::core::types::Document;

/// Per-format loader options (e.g. `encoding = utf8`)
pub type LoaderOptions = BTreeMap<String, String>;

/// A text extraction capability for one family of formats
pub trait Loader: Send + Sync {
    /// Extract zero or more documents from `path`
    fn load(&self, path: &Path, options: &LoaderOptions) -> Result<Vec<Document>>;
}

/// Identifies which extractor a format entry uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    Csv,
    WordDocument,
    EverNote,
    EPub,
    Html,
    Markdown,
    Odt,
    Pdf,
    PowerPoint,
    Text,
    Custom,
}

impl LoaderKind {
    /// Built-in loader for this kind
    ///
    /// Returns `None` for [`LoaderKind::Custom`], which has no
    /// built-in implementation.
    pub fn builtin(self) -> Option<Arc<dyn Loader>> {
        let loader: Arc<dyn Loader> = match self {
            LoaderKind::Csv => Arc::new(formats::CsvLoader),
            LoaderKind::WordDocument => Arc::new(formats::WordLoader),
            LoaderKind::EverNote => Arc::new(formats::EverNoteLoader),
            LoaderKind::EPub => Arc::new(formats::EpubLoader),
            LoaderKind::Html => Arc::new(formats::HtmlLoader),
            LoaderKind::Markdown => Arc::new(formats::MarkdownLoader),
            LoaderKind::Odt => Arc::new(formats::OdtLoader),
            LoaderKind::Pdf => Arc::new(formats::PdfLoader),
            LoaderKind::PowerPoint => Arc::new(formats::PowerPointLoader),
            LoaderKind::Text => Arc::new(formats::TextLoader),
            LoaderKind::Custom => return None,
        };
        Some(loader)
    }
}

/// A registered format: extension, loader and its options
#[derive(Clone)]
pub struct FormatEntry {
    /// Lowercase extension with leading dot
    pub extension: String,
    pub kind: LoaderKind,
    pub options: LoaderOptions,
    loader: Arc<dyn Loader>,
}

impl FormatEntry {
    /// Run this entry's loader on `path`
    pub fn load(&self, path: &Path) -> Result<Vec<Document>> {
        self.loader.load(path, &self.options)
    }
}

impl fmt::Debug for FormatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatEntry")
            .field("extension", &self.extension)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .finish()
    }
}

/// Maps file extensions to loaders
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    entries: BTreeMap<String, FormatEntry>,
}

/// Normalize an extension to lowercase with a leading dot
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.');
    format!(".{}", trimmed.to_lowercase())
}

impl FormatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the default document formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let defaults: [(&str, LoaderKind); 12] = [
            (".csv", LoaderKind::Csv),
            (".doc", LoaderKind::WordDocument),
            (".docx", LoaderKind::WordDocument),
            (".enex", LoaderKind::EverNote),
            (".epub", LoaderKind::EPub),
            (".html", LoaderKind::Html),
            (".md", LoaderKind::Markdown),
            (".odt", LoaderKind::Odt),
            (".pdf", LoaderKind::Pdf),
            (".ppt", LoaderKind::PowerPoint),
            (".pptx", LoaderKind::PowerPoint),
            (".txt", LoaderKind::Text),
        ];

        for (extension, kind) in defaults {
            let mut options = LoaderOptions::new();
            if kind == LoaderKind::Text {
                options.insert("encoding".to_string(), "utf8".to_string());
            }
            if let Some(loader) = kind.builtin() {
                registry.register(extension, kind, options, loader);
            }
        }

        registry
    }

    /// Add or replace the entry for `extension`
    pub fn register(
        &mut self,
        extension: &str,
        kind: LoaderKind,
        options: LoaderOptions,
        loader: Arc<dyn Loader>,
    ) {
        let extension = normalize_extension(extension);
        self.entries.insert(
            extension.clone(),
            FormatEntry {
                extension,
                kind,
                options,
                loader,
            },
        );
    }

    /// Look up the entry for an extension (case-insensitive)
    pub fn resolve(&self, extension: &str) -> Result<&FormatEntry> {
        let key = normalize_extension(extension);
        self.entries
            .get(&key)
            .ok_or_else(|| IngestError::UnsupportedFormat(format!("Unsupported file extension '{key}'")))
    }

    /// Look up the entry for a file path by its extension
    pub fn resolve_path(&self, path: &Path) -> Result<&FormatEntry> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.resolve(ext),
            None => Err(IngestError::UnsupportedFormat(format!(
                "No file extension: {}",
                path.display()
            ))),
        }
    }

    /// Check whether a path has a registered extension
    pub fn is_supported(&self, path: &Path) -> bool {
        self.resolve_path(path).is_ok()
    }

    /// Registered extensions in sorted order
    pub fn extensions(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
