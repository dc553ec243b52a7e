//! Queries that decide what a run still has to ingest.

use std::collections::HashSet;

use crate::core::error::Result;
use crate::core::storage::VectorStore;
use crate::core::types::source_of;

/// Whether the store already holds at least one record
pub fn exists(store: &dyn VectorStore) -> Result<bool> {
    Ok(!store.is_empty()?)
}

/// Distinct `source` values of every stored record
///
/// Records without a string `source` are ignored.
pub fn list_sources(store: &dyn VectorStore) -> Result<HashSet<String>> {
    let collection = store.list_all()?;
    Ok(collection
        .metadatas
        .iter()
        .filter_map(source_of)
        .map(str::to_string)
        .collect())
}
