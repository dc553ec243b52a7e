// Full runs through the CLI entry point

use crate::common::{unbroken_text, TestCorpus};
use clap::Parser;
use corpus_ingest::cli::{run, Cli};
use serial_test::serial;
use std::env;
use tempfile::TempDir;

/// Isolated XDG dirs and a config file pointing at `corpus`
struct CliEnv {
    home: TempDir,
}

impl CliEnv {
    fn new(corpus: &TestCorpus) -> Self {
        let home = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", home.path().join("config"));
        env::set_var("XDG_DATA_HOME", home.path().join("data"));
        for var in ["INGEST_CONFIG", "SOURCE_DIRECTORY", "PERSIST_DIRECTORY"] {
            env::remove_var(var);
        }

        let config = format!(
            "[source]\nsource_dir = {:?}\nworkers = 2\n\n[storage]\npersist_dir = {:?}\n\n[embedding]\ndimensions = 16\n",
            corpus.path().display().to_string(),
            home.path().join("db").display().to_string()
        );
        std::fs::write(home.path().join("ingest.toml"), config).unwrap();

        Self { home }
    }

    fn args(&self, extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "corpus-ingest".to_string(),
            "--config".to_string(),
            self.home.path().join("ingest.toml").display().to_string(),
            "--quiet".to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }

    fn index_file(&self) -> std::path::PathBuf {
        self.home.path().join("db").join("documents.json")
    }
}

impl Drop for CliEnv {
    fn drop(&mut self) {
        env::remove_var("XDG_CONFIG_HOME");
        env::remove_var("XDG_DATA_HOME");
    }
}

#[tokio::test]
#[serial]
async fn test_run_creates_index() {
    let text = unbroken_text(1200);
    let corpus = TestCorpus::with_files(&[("a.txt", text.as_str())]);
    let cli_env = CliEnv::new(&corpus);

    let cli = Cli::try_parse_from(cli_env.args(&["--format", "json"])).unwrap();
    run(cli).await.expect("CLI run should succeed");

    let index: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(cli_env.index_file()).unwrap()).unwrap();
    assert_eq!(index["records"].as_array().map(Vec::len), Some(3));
    assert_eq!(index["manifest"]["dimensions"], 16);
}

#[tokio::test]
#[serial]
async fn test_run_twice_is_idempotent() {
    let corpus = TestCorpus::with_files(&[("a.txt", "hello world")]);
    let cli_env = CliEnv::new(&corpus);

    run(Cli::try_parse_from(cli_env.args(&[])).unwrap()).await.unwrap();
    let before = std::fs::read(cli_env.index_file()).unwrap();

    run(Cli::try_parse_from(cli_env.args(&[])).unwrap()).await.unwrap();
    assert_eq!(std::fs::read(cli_env.index_file()).unwrap(), before);
}

#[tokio::test]
#[serial]
async fn test_run_reports_load_failure() {
    let corpus = TestCorpus::with_files(&[("good.txt", "fine")]);
    corpus.add_file("bad.txt", &[0xff, 0xfe, 0xfd]);
    let cli_env = CliEnv::new(&corpus);

    let result = run(Cli::try_parse_from(cli_env.args(&[])).unwrap()).await;
    assert!(result.is_err(), "Bad file should abort the run");
    assert!(!cli_env.index_file().exists());

    run(Cli::try_parse_from(cli_env.args(&["--skip-failed"])).unwrap())
        .await
        .expect("Skipping failed files should succeed");
    assert!(cli_env.index_file().exists());
}
