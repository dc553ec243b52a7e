// Load failures and aborted runs

use crate::common::{ingest, open_store, test_config, TestCorpus, TestIndex};
use corpus_ingest::core::storage::VectorStore;
use corpus_ingest::IngestError;

const INVALID_UTF8: &[u8] = &[0x66, 0x6f, 0xff, 0xfe, 0x6f];

#[tokio::test]
async fn test_bad_file_aborts_by_default() {
    let corpus = TestCorpus::with_files(&[("good.txt", "fine")]);
    corpus.add_file("bad.txt", INVALID_UTF8);
    let index = TestIndex::new();
    let config = test_config(corpus.path(), index.path());

    let err = ingest(&config).await.unwrap_err();

    assert!(
        matches!(err, IngestError::LoadError { ref path, .. } if path.ends_with("bad.txt")),
        "Unexpected error: {err}"
    );
    assert!(!index.index_file().exists(), "Nothing should be persisted");
}

#[tokio::test]
async fn test_skip_failed_files() {
    let corpus = TestCorpus::with_files(&[("good.txt", "fine")]);
    corpus.add_file("bad.txt", INVALID_UTF8);
    let index = TestIndex::new();
    let mut config = test_config(corpus.path(), index.path());
    config.source.skip_failed_files = true;

    let outcome = ingest(&config).await.unwrap();
    let stats = outcome.stats().unwrap();

    assert_eq!(stats.files_scanned, 2);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.documents_loaded, 1);
    assert_eq!(open_store(&config).unwrap().len().unwrap(), 1);
}

#[tokio::test]
async fn test_every_file_skipped_keeps_failure_count() {
    let corpus = TestCorpus::empty();
    corpus.add_file("bad.txt", INVALID_UTF8);
    corpus.add_file("worse.txt", INVALID_UTF8);
    let index = TestIndex::new();
    let mut config = test_config(corpus.path(), index.path());
    config.source.skip_failed_files = true;

    let outcome = ingest(&config).await.unwrap();
    let stats = outcome.stats().expect("Failures should be reported");

    assert_eq!(stats.files_failed, 2);
    assert_eq!(stats.documents_loaded, 0);
    assert!(!index.index_file().exists(), "Nothing should be persisted");
}

#[tokio::test]
async fn test_failed_run_leaves_index_untouched() {
    let corpus = TestCorpus::with_files(&[("a.txt", "first document")]);
    let index = TestIndex::new();
    let config = test_config(corpus.path(), index.path());

    ingest(&config).await.unwrap();
    let before = std::fs::read(index.index_file()).unwrap();

    corpus.add_file("b.txt", b"second document");
    corpus.add_file("c.txt", INVALID_UTF8);
    assert!(ingest(&config).await.is_err());

    assert_eq!(std::fs::read(index.index_file()).unwrap(), before);

    // Fixing the bad file lets the next run pick up both new files
    corpus.add_file("c.txt", b"third document");
    let outcome = ingest(&config).await.unwrap();
    assert_eq!(outcome.stats().unwrap().files_scanned, 2);
    assert_eq!(open_store(&config).unwrap().len().unwrap(), 3);
}

#[tokio::test]
async fn test_missing_source_dir() {
    let index = TestIndex::new();
    let missing = index.path().join("does-not-exist");
    let config = test_config(&missing, index.path());

    let err = ingest(&config).await.unwrap_err();
    assert!(matches!(err, IngestError::InvalidPath(_)), "Unexpected error: {err}");
}

#[tokio::test]
async fn test_invalid_chunk_config_fails_before_loading() {
    let corpus = TestCorpus::with_files(&[("a.txt", "text")]);
    let index = TestIndex::new();
    let mut config = test_config(corpus.path(), index.path());
    config.indexing.chunk_overlap = config.indexing.chunk_size;

    let err = ingest(&config).await.unwrap_err();
    assert!(matches!(err, IngestError::ConfigError(_)));
    assert!(!index.index_file().exists());
}
