// Local index persistence across process runs

use crate::common::{open_store, test_config, TestIndex};
use corpus_ingest::core::storage::{IndexManifest, VectorStore, SCHEMA_VERSION};
use corpus_ingest::core::types::{Chunk, Metadata, SOURCE_KEY};
use corpus_ingest::IngestError;

fn chunk(source: &str, index: usize, text: &str) -> Chunk {
    let mut metadata = Metadata::new();
    metadata.insert(SOURCE_KEY.to_string(), serde_json::json!(source));
    Chunk {
        text: text.to_string(),
        metadata,
        chunk_index: index,
    }
}

#[test]
fn test_persist_and_reopen() {
    let index = TestIndex::new();
    let config = test_config(index.path(), index.path());

    let mut store = open_store(&config).unwrap();
    assert!(store.is_empty().unwrap());
    store
        .create_from_documents(&[chunk("/a.txt", 0, "alpha"), chunk("/a.txt", 1, "beta")])
        .unwrap();
    store.persist().unwrap();

    let reopened = open_store(&config).unwrap();
    assert_eq!(reopened.len().unwrap(), 2);
    assert_eq!(reopened.list_all().unwrap().documents, vec!["alpha", "beta"]);

    let manifest: &IndexManifest = reopened.manifest().expect("Manifest should be stored");
    assert_eq!(manifest.schema_version, SCHEMA_VERSION);
    assert_eq!(manifest.dimensions, 32);
    assert!(reopened.records().iter().all(|r| r.embedding.len() == 32));
}

#[test]
fn test_unpersisted_changes_are_lost() {
    let index = TestIndex::new();
    let config = test_config(index.path(), index.path());

    let mut store = open_store(&config).unwrap();
    store.add_documents(&[chunk("/a.txt", 0, "alpha")]).unwrap();
    drop(store);

    assert!(!index.index_file().exists());
    assert!(open_store(&config).unwrap().is_empty().unwrap());
}

#[test]
fn test_model_mismatch_rejected() {
    let index = TestIndex::new();
    let config = test_config(index.path(), index.path());

    let mut store = open_store(&config).unwrap();
    store.create_from_documents(&[chunk("/a.txt", 0, "alpha")]).unwrap();
    store.persist().unwrap();

    let mut other = config.clone();
    other.embedding.model = "hashing-bow-v2".to_string();
    let err = open_store(&other).unwrap_err();
    assert!(matches!(err, IngestError::BackendError(_)), "Unexpected error: {err}");

    let mut resized = config.clone();
    resized.embedding.dimensions = 64;
    assert!(open_store(&resized).is_err());
}

#[test]
fn test_corrupt_index_is_backend_error() {
    let index = TestIndex::new();
    std::fs::write(index.index_file(), "{ not json").unwrap();
    let config = test_config(index.path(), index.path());

    let err = open_store(&config).unwrap_err();
    assert!(matches!(err, IngestError::BackendError(_)), "Unexpected error: {err}");
}

#[test]
fn test_identical_chunks_are_not_duplicated() {
    let index = TestIndex::new();
    let config = test_config(index.path(), index.path());

    let mut store = open_store(&config).unwrap();
    store.add_documents(&[chunk("/a.txt", 0, "alpha")]).unwrap();
    store.add_documents(&[chunk("/a.txt", 0, "alpha")]).unwrap();

    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_collection_name_selects_file() {
    let index = TestIndex::new();
    let mut config = test_config(index.path(), index.path());
    config.storage.collection = "papers".to_string();

    let mut store = open_store(&config).unwrap();
    store.add_documents(&[chunk("/a.txt", 0, "alpha")]).unwrap();
    store.persist().unwrap();

    assert!(index.path().join("papers.json").exists());
    assert!(!index.index_file().exists());
}
