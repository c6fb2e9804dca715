//! Terminal progress for the capture stage

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})";

/// Chapters written out of chapters listed
///
/// Purely informational; a hidden bar accepts the same calls.
#[derive(Debug, Clone)]
pub struct CaptureProgress {
    bar: ProgressBar,
}

impl CaptureProgress {
    /// Creates a visible bar for `total` chapters
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        bar.set_message("Capturing");
        Self { bar }
    }

    /// Creates a bar that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Visible bar when `enabled`, hidden otherwise
    pub fn for_run(total: usize, enabled: bool) -> Self {
        if enabled {
            Self::new(total)
        } else {
            Self::hidden()
        }
    }

    /// Records one more chapter written
    pub fn chapter_written(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Captured");
    }

    /// Leaves the bar where it stopped
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
