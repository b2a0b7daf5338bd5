//! CLI-specific progress handling for sparse-lapjv
//!
//! Provides the progress bar shown while a batch is being solved.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use sparse_lapjv::ProgressCallback;

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} instances ({percent}%) ETA: {eta}";

/// Creates a progress bar counting solved instances
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Progress manager for batch solves
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total: u64, message: &str) -> Self {
        let pb = create_progress_bar(total);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Callback for the solver, safe to call from worker threads
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |solved, total| {
            if pb.length().unwrap_or(0) != total {
                pb.set_length(total);
            }
            // workers finish out of order
            if solved > pb.position() {
                pb.set_position(solved);
            }
        })
    }

    pub fn finish(&self, message: &str) {
        self.pb.finish_with_message(message.to_string());
    }
}
