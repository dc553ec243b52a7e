//! Ingestion pipeline orchestration.
//!
//! Coordinates one run end to end:
//! 1. Query the store for what is already indexed
//! 2. Collect and load new files in parallel
//! 3. Chunk the loaded documents
//! 4. Submit chunks in batches and persist once

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::Config;
use crate::core::error::{IngestError, Result};
use crate::core::indexer::{BatchLoader, Chunker, CorpusScanner, LoadProgress};
use crate::core::loader::{DocumentLoader, FormatRegistry};
use crate::core::storage::{sync, VectorStore};
use crate::core::types::{IngestMode, IngestOutcome, IngestStats};

/// Per-run parameters, fixed before scanning starts
#[derive(Debug, Clone)]
pub struct IngestionState {
    /// Canonical source directory
    pub source_dir: PathBuf,

    /// Sources already present in the index
    pub excluded_sources: HashSet<String>,

    pub mode: IngestMode,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl IngestionState {
    /// Decide mode and exclusions from the current store contents
    ///
    /// The source directory is canonicalized so stored `source`
    /// values and rescanned paths compare equal across runs.
    pub fn prepare(config: &Config, store: &dyn VectorStore) -> Result<Self> {
        let configured = &config.source.source_dir;
        let source_dir = configured.canonicalize().map_err(|e| {
            IngestError::InvalidPath(format!(
                "Source directory {} is not accessible: {e}",
                configured.display()
            ))
        })?;

        let (mode, excluded_sources) = if sync::exists(store)? {
            (IngestMode::AppendExisting, sync::list_sources(store)?)
        } else {
            (IngestMode::CreateNew, HashSet::new())
        };

        Ok(Self {
            source_dir,
            excluded_sources,
            mode,
            chunk_size: config.indexing.chunk_size,
            chunk_overlap: config.indexing.chunk_overlap,
            batch_size: config.indexing.batch_size,
        })
    }
}

/// Observable pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Scanning,
    NoNewDocuments,
    Chunking,
    Storing,
    Persisting,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::Scanning => "scanning",
            PipelineState::NoNewDocuments => "no_new_documents",
            PipelineState::Chunking => "chunking",
            PipelineState::Storing => "storing",
            PipelineState::Persisting => "persisting",
            PipelineState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Orchestrates the ingestion pipeline
pub struct IngestionPipeline<S: VectorStore> {
    config: Config,
    loader: Arc<DocumentLoader>,
    store: S,
    state: PipelineState,
}

impl<S: VectorStore> IngestionPipeline<S> {
    /// Create a pipeline over `store`
    ///
    /// `config` is expected to be validated already; invalid sizes
    /// are reported when `run` starts.
    pub fn new(config: Config, registry: Arc<FormatRegistry>, store: S) -> Self {
        Self {
            config,
            loader: Arc::new(DocumentLoader::new(registry)),
            store,
            state: PipelineState::Init,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!("Pipeline state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn no_new_documents(&mut self) -> IngestOutcome {
        self.transition(PipelineState::NoNewDocuments);
        tracing::info!("No new documents to load");
        IngestOutcome::NoNewDocuments
    }

    /// End a run that produced no chunks
    ///
    /// Skipped files are still reported through `Completed` stats so the
    /// failure count is not lost. The store is untouched either way.
    fn nothing_to_store(
        &mut self,
        state: &IngestionState,
        files_scanned: usize,
        files_failed: usize,
        start: Instant,
    ) -> IngestOutcome {
        if files_failed == 0 {
            return self.no_new_documents();
        }

        self.transition(PipelineState::Done);
        tracing::warn!(
            "No documents loaded: all {} failed file(s) were skipped",
            files_failed
        );
        IngestOutcome::Completed(IngestStats {
            mode: state.mode,
            files_scanned,
            files_failed,
            documents_loaded: 0,
            chunks_created: 0,
            batches_submitted: 0,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Run one ingestion pass
    ///
    /// Returns `NoNewDocuments` without touching the store when
    /// nothing new is found. When every loaded file was skipped as
    /// failed, returns `Completed` stats with zero chunks, again without
    /// touching the store. Otherwise stores every chunk and calls
    /// `persist` exactly once. Any error aborts the run.
    pub async fn run(&mut self, progress: &dyn LoadProgress) -> Result<IngestOutcome> {
        let start = Instant::now();
        self.state = PipelineState::Init;

        let chunker = Chunker::new(
            self.config.indexing.chunk_size,
            self.config.indexing.chunk_overlap,
        )?;
        let batches = BatchLoader::new(self.config.indexing.batch_size)?;
        let scanner = CorpusScanner::new(Arc::clone(&self.loader), &self.config.source)?;

        let state = IngestionState::prepare(&self.config, &self.store)?;
        match state.mode {
            IngestMode::AppendExisting => tracing::info!(
                "Appending to existing index ({} sources already indexed)",
                state.excluded_sources.len()
            ),
            IngestMode::CreateNew => tracing::info!("Creating new index"),
        }

        // Step 1: Collect and load files
        self.transition(PipelineState::Scanning);
        tracing::info!("Loading documents from {}", state.source_dir.display());
        let files = scanner.collect_files(&state.source_dir, &state.excluded_sources)?;
        if files.is_empty() {
            return Ok(self.no_new_documents());
        }

        let files_scanned = files.len();
        tracing::info!(
            "Found {} new file(s), loading with {} workers",
            files_scanned,
            scanner.workers()
        );
        let report = scanner.load_documents(files, progress).await?;
        if !report.failed.is_empty() {
            tracing::warn!("Skipped {} file(s) that failed to load", report.failed.len());
        }
        if report.documents.is_empty() {
            return Ok(self.nothing_to_store(&state, files_scanned, report.failed.len(), start));
        }

        let documents_loaded = report.documents.len();
        tracing::info!(
            "Loaded {} new documents from {}",
            documents_loaded,
            state.source_dir.display()
        );

        // Step 2: Chunk
        self.transition(PipelineState::Chunking);
        let chunks = chunker.split_documents(report.documents);
        if chunks.is_empty() {
            return Ok(self.nothing_to_store(&state, files_scanned, report.failed.len(), start));
        }
        tracing::info!(
            "Split into {} chunks of text (max. {} chars each)",
            chunks.len(),
            state.chunk_size
        );

        // Step 3: Store and persist
        self.transition(PipelineState::Storing);
        let batch_report = batches.ingest(&mut self.store, &chunks, state.mode)?;

        self.transition(PipelineState::Persisting);
        self.store.persist()?;

        self.transition(PipelineState::Done);

        let stats = IngestStats {
            mode: state.mode,
            files_scanned,
            files_failed: report.failed.len(),
            documents_loaded,
            chunks_created: chunks.len(),
            batches_submitted: batch_report.batches,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Ingestion complete: {} documents, {} chunks in {} batches ({}ms)",
            stats.documents_loaded,
            stats.chunks_created,
            stats.batches_submitted,
            stats.duration_ms
        );

        Ok(IngestOutcome::Completed(stats))
    }
}
