//! Document ingestion module.
//!
//! Handles corpus scanning, text chunking and batched storage for
//! building the vector index. Key features:
//!
//! - Parallel, bounded loading of new files only
//! - Recursive boundary-aware chunking measured in characters
//! - Batched submission with a single persist per run
//!
//! # Safety
//!
//! The chunker never slices inside a character, so documents with
//! emojis or other multi-byte sequences cannot cause panics.

pub mod batch;
pub mod chunker;
pub mod pipeline;
pub mod scanner;

pub use batch::{BatchLoader, BatchReport};
pub use chunker::Chunker;
pub use pipeline::{IngestionPipeline, IngestionState, PipelineState};
pub use scanner::{CorpusScanner, FailedFile, LoadProgress, NoProgress, ScanReport};
