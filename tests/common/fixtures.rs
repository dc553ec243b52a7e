// Test fixtures for integration testing

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Source directory fixture with synthetic documents
#[allow(dead_code)] // Used in integration tests
pub struct TestCorpus {
    pub dir: TempDir,
}

impl TestCorpus {
    /// An empty source directory
    #[allow(dead_code)]
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// A source directory holding the given (relative path, content) files
    #[allow(dead_code)]
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let corpus = Self::empty();
        for (path, content) in files {
            corpus.add_file(path, content.as_bytes());
        }
        corpus
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories
    #[allow(dead_code)]
    pub fn add_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Source string recorded in the index for a relative path
    #[allow(dead_code)]
    pub fn source_of(&self, relative: &str) -> String {
        self.dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize corpus")
            .join(relative)
            .to_string_lossy()
            .into_owned()
    }
}

/// `len` characters without any whitespace
#[allow(dead_code)]
pub fn unbroken_text(len: usize) -> String {
    (0..len)
        .map(|i| char::from(b'a' + (i % 26) as u8))
        .collect()
}
