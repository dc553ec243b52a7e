//! Deterministic local embedder.
//!
//! Maps lowercase word tokens onto a signed hashed bag of words and
//! L2-normalizes the result. No model files, no network.

use sha2::{Digest, Sha256};

use crate::core::embedding::Embedder;
use crate::core::error::{IngestError, Result};

/// Feature-hashing embedder keyed by model name
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    model: String,
    dimensions: usize,
}

impl HashingEmbedder {
    /// Identifier of the built-in model
    pub const DEFAULT_MODEL: &'static str = "hashing-bow";

    /// Whether `model` names a hashing model
    ///
    /// Accepts the default identifier and `hashing-bow-<variant>`,
    /// where the variant seeds a different hash space.
    pub fn provides(model: &str) -> bool {
        model == Self::DEFAULT_MODEL
            || model
                .strip_prefix(Self::DEFAULT_MODEL)
                .and_then(|rest| rest.strip_prefix('-'))
                .is_some_and(|variant| !variant.is_empty())
    }

    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
        }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let mut hasher = Sha256::new();
        hasher.update(self.model.as_bytes());
        hasher.update([0u8]);
        hasher.update(token.as_bytes());
        let digest = hasher.finalize();

        let hash = digest[..8]
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };

        ((hash % self.dimensions as u64) as usize, sign)
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimensions == 0 {
            return Err(IngestError::BackendError(
                "Embedding dimensions must be non-zero".to_string(),
            ));
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokens(text) {
            let (index, sign) = self.bucket(&token);
            vector[index] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        Ok(vector)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
