//! Terminal progress bar for document loading.

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::indexer::LoadProgress;

const TEMPLATE: &str = "Loading new documents [{bar:40}] {pos}/{len} ({elapsed})";

/// [`LoadProgress`] drawn to stderr with indicatif
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// A visible bar, or a hidden one that draws nothing
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };

        match ProgressStyle::with_template(TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("=> ")),
            Err(e) => tracing::debug!("Invalid progress template: {}", e),
        }

        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl LoadProgress for ProgressReporter {
    fn set_total(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn inc(&self, delta: usize) {
        self.bar.inc(delta as u64);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
