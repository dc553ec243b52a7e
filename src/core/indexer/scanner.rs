//! Corpus scanning and parallel loading.
//!
//! Finds candidate files under the source directory and loads them
//! on a bounded pool of blocking workers. Walk errors (permission
//! denied, etc.) are logged and skipped.

use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::{DirEntry, WalkDir};

use crate::core::config::SourceConfig;
use crate::core::error::{IngestError, Result};
use crate::core::loader::{source_string, DocumentLoader};
use crate::core::types::Document;

/// Receives loading progress, one tick per finished file
pub trait LoadProgress: Send + Sync {
    fn set_total(&self, total: usize);
    fn inc(&self, delta: usize);
    fn finish(&self);
}

/// Progress sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl LoadProgress for NoProgress {
    fn set_total(&self, _total: usize) {}
    fn inc(&self, _delta: usize) {}
    fn finish(&self) {}
}

/// A file whose loader failed while failures were being skipped
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Result of loading a set of files
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Documents in completion order
    pub documents: Vec<Document>,

    /// Files that loaded successfully
    pub files_loaded: usize,

    /// Skipped files (only populated when skipping is enabled)
    pub failed: Vec<FailedFile>,
}

/// Walks the source directory and loads candidate files
pub struct CorpusScanner {
    loader: Arc<DocumentLoader>,
    exclude_patterns: Vec<Pattern>,
    workers: usize,
    skip_failed: bool,
    completed: Arc<AtomicUsize>,
}

impl CorpusScanner {
    /// Create a scanner from the source configuration
    ///
    /// Fails with `ConfigError` if an exclude pattern is not a valid
    /// glob.
    pub fn new(loader: Arc<DocumentLoader>, config: &SourceConfig) -> Result<Self> {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    IngestError::ConfigError(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            loader,
            exclude_patterns,
            workers: config.effective_workers(),
            skip_failed: config.skip_failed_files,
            completed: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Files finished so far, across all `load_documents` calls
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Candidate files under `source_dir`, sorted
    ///
    /// Keeps regular files with a registered extension, skips hidden
    /// directories and exclude patterns, and drops every path whose
    /// string form is in `excluded`.
    pub fn collect_files(
        &self,
        source_dir: &Path,
        excluded: &HashSet<String>,
    ) -> Result<Vec<PathBuf>> {
        if !source_dir.is_dir() {
            return Err(IngestError::InvalidPath(format!(
                "Source directory does not exist: {}",
                source_dir.display()
            )));
        }

        let registry = self.loader.registry();
        let mut files = Vec::new();
        let mut already_indexed = 0usize;

        for entry in WalkDir::new(source_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, source_dir))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !registry.is_supported(path) || self.is_excluded(path) {
                continue;
            }

            if excluded.contains(&source_string(path)) {
                already_indexed += 1;
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        files.dedup();

        tracing::debug!(
            "Found {} new file(s), {} already indexed",
            files.len(),
            already_indexed
        );
        Ok(files)
    }

    /// Load `files` on the worker pool
    ///
    /// Results are collected in completion order. The first failure
    /// aborts the scan unless failed files are being skipped.
    pub async fn load_documents(
        &self,
        files: Vec<PathBuf>,
        progress: &dyn LoadProgress,
    ) -> Result<ScanReport> {
        progress.set_total(files.len());

        let semaphore = Arc::new(Semaphore::new(self.workers.max(1)));
        let mut tasks = JoinSet::new();

        for path in files {
            let loader = Arc::clone(&self.loader);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let err = IngestError::BackendError(format!("Loader pool closed: {e}"));
                        return (path, Err(err));
                    }
                };

                let task_path = path.clone();
                let result = tokio::task::spawn_blocking(move || loader.load(&task_path))
                    .await
                    .unwrap_or_else(|e| Err(IngestError::load(&path, format!("loader task failed: {e}"))));
                (path, result)
            });
        }

        let mut report = ScanReport::default();

        while let Some(joined) = tasks.join_next().await {
            let (path, result) = joined
                .map_err(|e| IngestError::BackendError(format!("Loader task failed: {e}")))?;

            self.completed.fetch_add(1, Ordering::SeqCst);
            progress.inc(1);

            match result {
                Ok(documents) => {
                    report.files_loaded += 1;
                    report.documents.extend(documents);
                }
                Err(e) if self.skip_failed && e.is_file_error() => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    report.failed.push(FailedFile {
                        path,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    tasks.abort_all();
                    progress.finish();
                    return Err(e);
                }
            }
        }

        progress.finish();
        Ok(report)
    }

    /// Determine if a directory entry should be descended into
    ///
    /// Never filters the root directory itself.
    fn should_process_entry(&self, entry: &DirEntry, root: &Path) -> bool {
        let path = entry.path();

        if path == root {
            return true;
        }

        if !entry.file_type().is_dir() {
            return true;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        if self.exclude_patterns.iter().any(|p| p.matches_path(path)) {
            tracing::debug!("Skipping excluded directory: {:?}", path);
            return false;
        }

        true
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_patterns.iter().any(|p| p.matches_path(path))
    }
}
