//! Progress bar display for the component sequence

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display over the selected components
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    /// Create a new progress display with total component count
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self { bar }
    }

    /// Show the component currently being processed
    pub fn update_component(&self, name: &str, current: usize, total: usize) {
        self.bar.set_message(format!("({current}/{total}) {name}"));
    }

    /// Increment component progress
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Clear the bar once the run is done
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
