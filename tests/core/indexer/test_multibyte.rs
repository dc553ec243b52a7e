// UTF-8 content through the full pipeline

use crate::common::{ingest, open_store, test_config, TestCorpus, TestIndex};
use corpus_ingest::core::storage::VectorStore;

#[tokio::test]
async fn test_multibyte_documents() {
    let chinese = "中文测试字符串".repeat(40);
    let emoji = "Hello 👋 World 🌍 Rust 🦀 ".repeat(30);
    let corpus = TestCorpus::with_files(&[
        ("chinese.txt", chinese.as_str()),
        ("emoji.md", emoji.as_str()),
        ("名前.txt", "ファイル名も日本語"),
    ]);
    let index = TestIndex::new();
    let mut config = test_config(corpus.path(), index.path());
    config.indexing.chunk_size = 50;
    config.indexing.chunk_overlap = 10;

    let outcome = ingest(&config).await.unwrap();
    assert_eq!(outcome.stats().unwrap().files_scanned, 3);

    let collection = open_store(&config).unwrap().list_all().unwrap();
    assert!(collection.documents.len() > 3);
    for document in &collection.documents {
        assert!(
            document.chars().count() <= 50,
            "Chunk exceeds size: {}",
            document.chars().count()
        );
    }
    assert!(collection
        .documents
        .iter()
        .any(|d| d == "ファイル名も日本語"));
}

#[tokio::test]
async fn test_byte_order_mark_is_stripped() {
    let corpus = TestCorpus::empty();
    corpus.add_file("bom.txt", "\u{feff}Leading mark".as_bytes());
    let index = TestIndex::new();
    let config = test_config(corpus.path(), index.path());

    ingest(&config).await.unwrap();

    let store = open_store(&config).unwrap();
    assert_eq!(store.list_all().unwrap().documents, vec!["Leading mark".to_string()]);
    assert_eq!(store.len().unwrap(), 1);
}
