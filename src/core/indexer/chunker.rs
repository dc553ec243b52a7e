//! UTF-8 safe recursive text chunking.
//!
//! Splits text on the coarsest boundary that yields pieces fitting
//! the chunk size (paragraph, then line, then word, then character)
//! and greedily merges the pieces back into chunks with a bounded
//! overlap. All lengths are counted in characters, so chunk
//! boundaries always fall on valid character boundaries.
//!
//! # Example
//!
//! ```
//! use corpus_ingest::core::indexer::Chunker;
//!
//! let chunker = Chunker::new(10, 2).unwrap();
//! let chunks = chunker.split_text("Hello 👋 World 🌍 Rust 🦀");
//!
//! for chunk in chunks {
//!     assert!(chunk.chars().count() <= 10);
//! }
//! ```

use std::collections::VecDeque;

use crate::core::error::{IngestError, Result};
use crate::core::types::{Chunk, Document};

/// Split boundaries, coarsest first; `""` splits between characters
pub const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive, boundary-aware text chunker.
///
/// Sizes are measured in **characters**, not bytes.
#[derive(Debug, Clone)]
pub struct Chunker {
    /// Maximum characters per chunk
    chunk_size: usize,

    /// Maximum characters carried over into the next chunk
    chunk_overlap: usize,
}

impl Chunker {
    /// Create a new chunker.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `chunk_size` is 0 or if
    /// `chunk_overlap >= chunk_size`.
    ///
    /// # Example
    ///
    /// ```
    /// use corpus_ingest::core::indexer::Chunker;
    ///
    /// let chunker = Chunker::new(500, 50).unwrap();
    /// assert_eq!(chunker.chunk_size(), 500);
    /// assert_eq!(chunker.overlap(), 50);
    ///
    /// assert!(Chunker::new(10, 10).is_err());
    /// ```
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(IngestError::ConfigError(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(IngestError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be < chunk_size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into chunks of at most `chunk_size` characters.
    ///
    /// Chunks are whitespace-trimmed; whitespace-only chunks are
    /// dropped. Deterministic for a given configuration.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        self.split_recursive(text, &SEPARATORS, &mut chunks);
        chunks
    }

    /// Split every document, copying its metadata to each chunk.
    ///
    /// `chunk_index` restarts at 0 for each document.
    pub fn split_documents(&self, documents: Vec<Document>) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for document in documents {
            for (chunk_index, text) in self.split_text(&document.text).into_iter().enumerate() {
                chunks.push(Chunk {
                    text,
                    metadata: document.metadata.clone(),
                    chunk_index,
                });
            }
        }

        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[&str], out: &mut Vec<String>) {
        // First separator present in the text; "" always matches
        let (position, separator) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
            .map(|(i, sep)| (i, *sep))
            .unwrap_or((separators.len(), ""));
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let mut fitting: Vec<&str> = Vec::new();

        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                self.merge(&fitting, out);
                fitting.clear();
            }

            if remaining.is_empty() {
                out.push(piece.to_string());
            } else {
                self.split_recursive(piece, remaining, out);
            }
        }

        if !fitting.is_empty() {
            self.merge(&fitting, out);
        }
    }

    /// Greedily join pieces into chunks, keeping an overlapping tail
    fn merge(&self, pieces: &[&str], out: &mut Vec<String>) {
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                emit(&window, out);

                // Drop leading pieces until the tail fits the overlap
                // and leaves room for the incoming piece
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some((_, front_len)) => total -= front_len,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        emit(&window, out);
    }
}

fn emit(window: &VecDeque<(&str, usize)>, out: &mut Vec<String>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split on `separator`, attaching it to the start of the next piece.
///
/// An empty separator splits into single characters. Empty pieces are
/// dropped.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > start {
            pieces.push(&text[start..index]);
        }
        start = index;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}
