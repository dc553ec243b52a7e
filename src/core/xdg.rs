//! XDG Base Directory Support
//!
//! Resolves where the config file and the default index directory
//! live on Linux/Unix systems.

use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "corpus-ingest";

/// XDG directory structure for corpus-ingest
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl XdgDirs {
    /// Create new XDG directory structure
    ///
    /// Priority order (highest to lowest):
    /// 1. XDG_* environment variables
    /// 2. XDG defaults (~/.config, ~/.local/share)
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve("XDG_CONFIG_HOME", &[".config"]),
            data_dir: Self::resolve("XDG_DATA_HOME", &[".local", "share"]),
        }
    }

    fn resolve(var: &str, fallback: &[&str]) -> PathBuf {
        if let Ok(xdg) = env::var(var) {
            if !xdg.is_empty() {
                return PathBuf::from(xdg).join(APP_DIR);
            }
        }

        let mut dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        for part in fallback {
            dir = dir.join(part);
        }
        dir.join(APP_DIR)
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Default directory for the persistent index
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("db")
    }

    /// Ensure all directories exist
    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Log resolved paths
    pub fn log_paths(&self) {
        tracing::debug!("XDG directories:");
        tracing::debug!("  Config: {}", self.config_dir.display());
        tracing::debug!("  Data:   {}", self.data_dir.display());
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
