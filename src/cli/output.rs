//! Output formatting for the CLI
//!
//! Renders an ingestion outcome in human-readable or JSON form.
//! Colored output respects the NO_COLOR env var.

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::types::IngestOutcome;

/// Color scheme for CLI output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Style for labels/headers
    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Style for file paths
    pub fn file_path(s: &str) -> ColoredString {
        s.blue()
    }

    /// Style for numbers/counts
    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for success messages
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    /// Style for warning messages
    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for error messages
    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }
}

/// JSON shape of a finished run
#[derive(Debug, Serialize)]
pub struct IngestResponse<'a> {
    pub source_dir: String,
    pub index_path: String,
    #[serde(flatten)]
    pub outcome: &'a IngestOutcome,
}

/// Format duration into human-readable string
pub fn format_duration(secs: f64) -> String {
    if secs >= 60.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs - (mins * 60.0);
        format!("{mins:.0}m {remaining_secs:.1}s")
    } else if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        let ms = secs * 1000.0;
        format!("{ms:.0}ms")
    }
}

/// Human-readable lines describing a run
pub fn render_human(response: &IngestResponse<'_>) -> Vec<String> {
    match response.outcome {
        IngestOutcome::NoNewDocuments => vec![format!(
            "{} under {}",
            colors::warning("No new documents to load"),
            colors::file_path(&response.source_dir)
        )],
        IngestOutcome::Completed(stats) if stats.chunks_created == 0 => vec![
            format!(
                "{} under {}",
                colors::warning("No documents stored"),
                colors::file_path(&response.source_dir)
            ),
            failed_line(stats.files_failed),
        ],
        IngestOutcome::Completed(stats) => {
            let mut lines = vec![format!(
                "{} {} documents ({} chunks, {} batches) in {}",
                colors::success("Ingested"),
                colors::number(&stats.documents_loaded.to_string()),
                colors::number(&stats.chunks_created.to_string()),
                colors::number(&stats.batches_submitted.to_string()),
                colors::number(&format_duration(stats.duration_ms as f64 / 1000.0))
            )];
            lines.push(format!(
                "{} {} ({})",
                colors::label("Index:"),
                colors::file_path(&response.index_path),
                stats.mode
            ));
            if stats.files_failed > 0 {
                lines.push(failed_line(stats.files_failed));
            }
            lines
        }
    }
}

fn failed_line(files_failed: usize) -> String {
    format!(
        "{}: {} file(s) failed to load and were skipped",
        colors::warning("Warning"),
        colors::number(&files_failed.to_string())
    )
}

/// Print a run's outcome in the requested format
pub fn print_outcome(
    response: &IngestResponse<'_>,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => {
            for line in render_human(response) {
                println!("{line}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
    }
    Ok(())
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{}: {}", colors::error("Error"), message);
}
