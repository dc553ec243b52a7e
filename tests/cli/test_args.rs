// Argument parsing and config resolution

use clap::Parser;
use corpus_ingest::cli::{Cli, OutputFormat};
use corpus_ingest::core::config::Config;
use corpus_ingest::core::xdg::XdgDirs;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

const ENV_VARS: [&str; 10] = [
    "INGEST_CONFIG",
    "SOURCE_DIRECTORY",
    "PERSIST_DIRECTORY",
    "EMBEDDINGS_MODEL_NAME",
    "INGEST_CHUNK_SIZE",
    "INGEST_CHUNK_OVERLAP",
    "INGEST_BATCH_SIZE",
    "INGEST_WORKERS",
    "INGEST_EMBEDDING_DIMENSIONS",
    "INGEST_SKIP_FAILED",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn temp_xdg(dir: &TempDir) -> XdgDirs {
    XdgDirs {
        config_dir: dir.path().join("config"),
        data_dir: dir.path().join("data"),
    }
}

#[test]
fn test_no_arguments_is_valid() {
    let cli = Cli::try_parse_from(["corpus-ingest"]).expect("Bare invocation should parse");

    assert!(cli.config.is_none());
    assert!(cli.source_dir.is_none());
    assert!(cli.chunk_size.is_none());
    assert!(!cli.skip_failed);
    assert!(!cli.quiet);
    assert_eq!(cli.format, OutputFormat::Human);
}

#[test]
fn test_all_flags() {
    let cli = Cli::try_parse_from([
        "corpus-ingest",
        "--source-dir",
        "/data/docs",
        "--persist-dir",
        "/data/db",
        "--chunk-size",
        "800",
        "--chunk-overlap",
        "80",
        "--batch-size",
        "25",
        "--workers",
        "3",
        "--skip-failed",
        "--format",
        "json",
        "-q",
    ])
    .unwrap();

    assert_eq!(cli.source_dir, Some(PathBuf::from("/data/docs")));
    assert_eq!(cli.persist_dir, Some(PathBuf::from("/data/db")));
    assert_eq!(cli.chunk_size, Some(800));
    assert_eq!(cli.chunk_overlap, Some(80));
    assert_eq!(cli.batch_size, Some(25));
    assert_eq!(cli.workers, Some(3));
    assert!(cli.skip_failed);
    assert!(cli.quiet);
    assert_eq!(cli.format, OutputFormat::Json);
}

#[test]
fn test_invalid_flag_values_rejected() {
    assert!(Cli::try_parse_from(["corpus-ingest", "--chunk-size", "large"]).is_err());
    assert!(Cli::try_parse_from(["corpus-ingest", "--format", "xml"]).is_err());
    assert!(Cli::try_parse_from(["corpus-ingest", "reindex"]).is_err());
}

#[test]
fn test_overrides_only_touch_given_flags() {
    let cli = Cli::try_parse_from(["corpus-ingest", "--chunk-size", "900"]).unwrap();
    let mut config = Config::default();
    let defaults = Config::default();

    cli.apply_overrides(&mut config);

    assert_eq!(config.indexing.chunk_size, 900);
    assert_eq!(config.indexing.chunk_overlap, defaults.indexing.chunk_overlap);
    assert_eq!(config.source.source_dir, defaults.source.source_dir);
    assert_eq!(config.source.skip_failed_files, defaults.source.skip_failed_files);
}

#[test]
#[serial]
fn test_flags_win_over_env_and_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("ingest.toml");
    std::fs::write(
        &file,
        "[indexing]\nchunk_size = 300\nchunk_overlap = 30\nbatch_size = 10\n",
    )
    .unwrap();

    env::set_var("INGEST_CHUNK_SIZE", "400");
    env::set_var("INGEST_BATCH_SIZE", "20");

    let cli = Cli::try_parse_from([
        "corpus-ingest",
        "--config",
        file.to_str().unwrap(),
        "--chunk-size",
        "600",
    ])
    .unwrap();
    let config = cli.resolve_config(&temp_xdg(&dir)).unwrap();

    assert_eq!(config.indexing.chunk_size, 600, "Flag beats env");
    assert_eq!(config.indexing.batch_size, 20, "Env beats file");
    assert_eq!(config.indexing.chunk_overlap, 30, "File beats default");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_combination_rejected() {
    clear_env();
    let dir = TempDir::new().unwrap();

    let cli = Cli::try_parse_from(["corpus-ingest", "--chunk-size", "40", "--chunk-overlap", "40"])
        .unwrap();
    let result = cli.resolve_config(&temp_xdg(&dir));

    assert!(result.is_err(), "Overlap equal to size should be rejected");
}

#[test]
#[serial]
fn test_default_persist_dir_uses_xdg_data_dir() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let xdg = temp_xdg(&dir);

    let cli = Cli::try_parse_from(["corpus-ingest"]).unwrap();
    let config = cli.resolve_config(&xdg).unwrap();

    assert_eq!(config.storage.persist_dir, Some(xdg.index_dir()));
}

#[test]
#[serial]
fn test_flag_repairs_file_value() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("ingest.toml");
    // Invalid on its own: the default overlap (50) exceeds the size
    std::fs::write(&file, "[indexing]\nchunk_size = 40\n").unwrap();

    let cli = Cli::try_parse_from([
        "corpus-ingest",
        "--config",
        file.to_str().unwrap(),
        "--chunk-overlap",
        "10",
    ])
    .unwrap();
    let config = cli
        .resolve_config(&temp_xdg(&dir))
        .expect("Flag should repair the file value");

    assert_eq!(config.indexing.chunk_size, 40);
    assert_eq!(config.indexing.chunk_overlap, 10);
}

#[test]
#[serial]
fn test_flag_repairs_env_value() {
    clear_env();
    let dir = TempDir::new().unwrap();
    env::set_var("INGEST_BATCH_SIZE", "0");

    let cli = Cli::try_parse_from(["corpus-ingest", "--batch-size", "5"]).unwrap();
    let result = cli.resolve_config(&temp_xdg(&dir));
    clear_env();

    assert_eq!(result.unwrap().indexing.batch_size, 5);
}
