// Result rendering

use corpus_ingest::cli::output::{format_duration, render_human, IngestResponse};
use corpus_ingest::core::types::{IngestMode, IngestOutcome, IngestStats};

fn response(outcome: &IngestOutcome) -> IngestResponse<'_> {
    IngestResponse {
        source_dir: "/data/docs".to_string(),
        index_path: "/data/db/documents.json".to_string(),
        outcome,
    }
}

fn completed(files_failed: usize) -> IngestOutcome {
    IngestOutcome::Completed(IngestStats {
        mode: IngestMode::AppendExisting,
        files_scanned: 4,
        files_failed,
        documents_loaded: 3,
        chunks_created: 12,
        batches_submitted: 1,
        duration_ms: 1500,
    })
}

#[test]
fn test_no_new_documents_message() {
    colored::control::set_override(false);
    let lines = render_human(&response(&IngestOutcome::NoNewDocuments));

    assert_eq!(lines, vec!["No new documents to load under /data/docs".to_string()]);
}

#[test]
fn test_completed_summary() {
    colored::control::set_override(false);
    let outcome = completed(0);
    let lines = render_human(&response(&outcome));

    assert!(lines[0].contains("3 documents"), "Got: {lines:?}");
    assert!(lines[0].contains("12 chunks"));
    assert!(lines.iter().any(|l| l.contains("/data/db/documents.json")));
    assert!(!lines.iter().any(|l| l.contains("failed")));
}

#[test]
fn test_failed_files_warning() {
    colored::control::set_override(false);
    let outcome = completed(1);
    let lines = render_human(&response(&outcome));

    assert!(lines.iter().any(|l| l.contains("1") && l.contains("failed")), "Got: {lines:?}");
}

#[test]
fn test_all_files_failed_summary() {
    colored::control::set_override(false);
    let outcome = IngestOutcome::Completed(IngestStats {
        mode: IngestMode::CreateNew,
        files_scanned: 2,
        files_failed: 2,
        documents_loaded: 0,
        chunks_created: 0,
        batches_submitted: 0,
        duration_ms: 3,
    });
    let lines = render_human(&response(&outcome));

    assert_eq!(
        lines,
        vec![
            "No documents stored under /data/docs".to_string(),
            "Warning: 2 file(s) failed to load and were skipped".to_string(),
        ]
    );
}

#[test]
fn test_json_shape() {
    let outcome = completed(0);
    let value = serde_json::to_value(response(&outcome)).unwrap();

    assert_eq!(value["source_dir"], "/data/docs");
    assert_eq!(value["index_path"], "/data/db/documents.json");
    assert_eq!(value["status"], "completed");
    assert_eq!(value["chunks_created"], 12);
    assert!(value.get("outcome").is_none(), "Outcome is flattened");
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0.25), "250ms");
    assert_eq!(format_duration(1.5), "1.50s");
}
