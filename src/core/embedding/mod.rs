//! Embedding capability.
//!
//! The store embeds chunk text through an [`EmbeddingFunction`], an
//! adapter chosen once at startup by probing the embedder with a
//! single batch call.

pub mod hashing;

pub use hashing::HashingEmbedder;

use std::fmt;
use std::sync::Arc;

use crate::core::config::EmbeddingConfig;
use crate::core::error::{IngestError, Result};

const SAMPLE_TEXT: &str = "example text";

/// Text to vector capability
pub trait Embedder: Send + Sync {
    /// Model identifier recorded in the index manifest
    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts in one call
    ///
    /// Embedders that only accept single texts return
    /// [`IngestError::EmbeddingInterface`].
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Adapter over an [`Embedder`], fixed by [`EmbeddingFunction::detect`]
#[derive(Clone)]
pub enum EmbeddingFunction {
    /// One `embed_batch` call per set of texts
    Batched(Arc<dyn Embedder>),

    /// One `embed` call per text
    PerText(Arc<dyn Embedder>),
}

impl EmbeddingFunction {
    /// Select the adapter by calling `embed_batch` once
    pub fn detect(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let sample = [SAMPLE_TEXT.to_string()];

        let function = match embedder.embed_batch(&sample) {
            Ok(vectors) => {
                check_shape(embedder.as_ref(), &vectors, 1)?;
                EmbeddingFunction::Batched(embedder)
            }
            Err(IngestError::EmbeddingInterface(reason)) => {
                tracing::debug!("Batch embedding unavailable: {}", reason);
                let vector = embedder
                    .embed(SAMPLE_TEXT)
                    .map_err(|e| IngestError::BackendError(format!("Embedding capability check failed: {e}")))?;
                check_shape(embedder.as_ref(), &[vector], 1)?;
                EmbeddingFunction::PerText(embedder)
            }
            Err(e) => {
                return Err(IngestError::BackendError(format!(
                    "Embedding capability check failed: {e}"
                )))
            }
        };

        tracing::info!(
            "Embedding model {} ({} dims), {} calls",
            function.model_name(),
            function.dimensions(),
            if function.is_batched() { "batched" } else { "per-text" }
        );
        Ok(function)
    }

    /// Detect the adapter for the built-in embedder configured by `config`
    ///
    /// Model names the built-in embedder cannot produce are rejected,
    /// so the index manifest never claims vectors of another model.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        if !HashingEmbedder::provides(&config.model) {
            return Err(IngestError::ConfigError(format!(
                "Embedding model '{}' is not available; the built-in embedder provides '{}' or '{}-<variant>'",
                config.model,
                HashingEmbedder::DEFAULT_MODEL,
                HashingEmbedder::DEFAULT_MODEL
            )));
        }

        Self::detect(Arc::new(HashingEmbedder::new(
            config.model.clone(),
            config.dimensions,
        )))
    }

    fn embedder(&self) -> &dyn Embedder {
        match self {
            EmbeddingFunction::Batched(embedder) | EmbeddingFunction::PerText(embedder) => {
                embedder.as_ref()
            }
        }
    }

    pub fn is_batched(&self) -> bool {
        matches!(self, EmbeddingFunction::Batched(_))
    }

    pub fn model_name(&self) -> &str {
        self.embedder().model_name()
    }

    pub fn dimensions(&self) -> usize {
        self.embedder().dimensions()
    }

    /// Embed `texts`, one vector per text in input order
    pub fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = match self {
            EmbeddingFunction::Batched(embedder) => embedder.embed_batch(texts),
            EmbeddingFunction::PerText(embedder) => {
                texts.iter().map(|text| embedder.embed(text)).collect()
            }
        }
        .map_err(|e| match e {
            IngestError::BackendError(_) => e,
            other => IngestError::BackendError(other.to_string()),
        })?;

        check_shape(self.embedder(), &vectors, texts.len())?;
        Ok(vectors)
    }
}

impl fmt::Debug for EmbeddingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingFunction")
            .field("model", &self.model_name())
            .field("dimensions", &self.dimensions())
            .field("batched", &self.is_batched())
            .finish()
    }
}

fn check_shape(embedder: &dyn Embedder, vectors: &[Vec<f32>], expected: usize) -> Result<()> {
    if vectors.len() != expected {
        return Err(IngestError::BackendError(format!(
            "Embedder returned {} vectors for {} texts",
            vectors.len(),
            expected
        )));
    }

    if let Some(bad) = vectors.iter().find(|v| v.len() != embedder.dimensions()) {
        return Err(IngestError::BackendError(format!(
            "Embedder returned {} dimensions, expected {}",
            bad.len(),
            embedder.dimensions()
        )));
    }

    Ok(())
}
