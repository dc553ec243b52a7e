//! Batched submission of chunks to the vector store.

use std::slice::Chunks;

use crate::core::error::{IngestError, Result};
use crate::core::storage::VectorStore;
use crate::core::types::{Chunk, IngestMode};

/// What a [`BatchLoader::ingest`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Batches submitted successfully
    pub batches: usize,

    /// Chunks submitted successfully
    pub chunks: usize,

    /// Mode of the last store call
    pub final_mode: IngestMode,
}

/// Splits chunks into fixed-size batches and submits them in order
#[derive(Debug, Clone, Copy)]
pub struct BatchLoader {
    batch_size: usize,
}

impl BatchLoader {
    /// Create a loader submitting `batch_size` chunks per call
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(IngestError::ConfigError(
                "Batch size must be non-zero".to_string(),
            ));
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Consecutive slices of at most `batch_size` chunks
    pub fn partition<'a>(&self, chunks: &'a [Chunk]) -> Chunks<'a, Chunk> {
        chunks.chunks(self.batch_size)
    }

    /// Submit every chunk to `store`
    ///
    /// In `CreateNew` mode the first batch creates the collection and
    /// the rest are appended; in `AppendExisting` mode every batch is
    /// appended. A failing batch stops the remaining ones.
    pub fn ingest(
        &self,
        store: &mut dyn VectorStore,
        chunks: &[Chunk],
        mode: IngestMode,
    ) -> Result<BatchReport> {
        let total = chunks.len().div_ceil(self.batch_size);
        let mut report = BatchReport {
            batches: 0,
            chunks: 0,
            final_mode: mode,
        };

        for (index, batch) in self.partition(chunks).enumerate() {
            let call_mode = if index == 0 { mode } else { IngestMode::AppendExisting };

            let result = match call_mode {
                IngestMode::CreateNew => store.create_from_documents(batch),
                IngestMode::AppendExisting => store.add_documents(batch),
            };

            result.map_err(|e| {
                IngestError::BackendError(format!(
                    "Batch {}/{} ({} chunks) failed: {}",
                    index + 1,
                    total,
                    batch.len(),
                    e
                ))
            })?;

            report.batches += 1;
            report.chunks += batch.len();
            report.final_mode = call_mode;
            tracing::debug!(
                "Stored batch {}/{} ({} chunks, {})",
                index + 1,
                total,
                batch.len(),
                call_mode
            );
        }

        Ok(report)
    }
}
