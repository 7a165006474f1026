//! Progress observation — a one-way event interface
//!
//! The pipeline emits advance/status events and a terminal `complete`; it
//! never reads anything back. Renderers are interchangeable: a terminal
//! progress bar for interactive runs, a no-op for tests and scripted use.

use indicatif::{ProgressBar, ProgressStyle};

/// Observer for pipeline progress. All methods take `&self`; implementors
/// handle their own interior mutability.
pub trait ProgressReporter: Send + Sync {
    /// `done` of `total` units finished.
    fn advance(&self, done: usize, total: usize);

    /// Free-form status line.
    fn status(&self, text: &str);

    /// No further events will follow.
    fn complete(&self);
}

/// Discards every event.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn advance(&self, _done: usize, _total: usize) {}
    fn status(&self, _text: &str) {}
    fn complete(&self) {}
}

/// Renders a terminal progress bar.
pub struct TerminalReporter {
    bar: ProgressBar,
}

impl TerminalReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("static template is valid")
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for TerminalReporter {
    fn advance(&self, done: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
    }

    fn status(&self, text: &str) {
        self.bar.set_message(text.to_owned());
    }

    fn complete(&self) {
        self.bar.finish_and_clear();
    }
}
