//! corpus-ingest - Command-line entry point
//!
//! Ingests new documents from a source directory into a persistent
//! vector index. All settings come from flags, environment variables
//! (optionally from a `.env` file) or a TOML config file.
//!
//! # Examples
//!
//! ```bash
//! # Ingest ./source_documents into the default index
//! corpus-ingest
//!
//! # Ingest a specific tree, machine-readable output
//! corpus-ingest --source-dir ~/papers --persist-dir ./db --format json
//!
//! # Keep going past unreadable files
//! corpus-ingest --skip-failed
//! ```

use clap::Parser;
use corpus_ingest::cli::output::print_error;
use corpus_ingest::cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "corpus_ingest=info".into());

    let json = std::env::var("INGEST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    // Before logging, so RUST_LOG may come from .env
    let dotenv = dotenvy::dotenv();

    init_logging();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => {
            print_error(&format!("Failed to read .env: {e}"));
            std::process::exit(1);
        }
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
