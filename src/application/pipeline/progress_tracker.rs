use crate::ports::outbound::ProgressReporter;
use std::sync::atomic::{AtomicU8, Ordering};

/// Forwards progress to the caller's sink, never letting it go backwards.
///
/// Percentages above 100 are clamped; a value lower than one already
/// reported is replaced by the highest value seen so far.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressReporter,
    highest: AtomicU8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a dyn ProgressReporter) -> Self {
        Self {
            sink,
            highest: AtomicU8::new(0),
        }
    }

    /// Highest percentage reported so far
    pub fn current(&self) -> u8 {
        self.highest.load(Ordering::SeqCst)
    }
}

impl ProgressReporter for ProgressTracker<'_> {
    fn report_progress(&self, percent: u8, message: &str) {
        let percent = percent.min(100);
        let previous = self.highest.fetch_max(percent, Ordering::SeqCst);
        self.sink.report_progress(percent.max(previous), message);
    }

    fn report_error(&self, message: &str) {
        self.sink.report_error(message);
    }

    fn report_completion(&self, message: &str) {
        self.sink.report_completion(message);
    }
}
