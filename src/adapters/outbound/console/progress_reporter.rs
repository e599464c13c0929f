use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// StderrProgressReporter adapter for reporting import progress to stderr
///
/// This adapter implements the ProgressReporter port with an indicatif bar
/// of 100 steps, one per percent. It writes to stderr so it doesn't
/// interfere with stdout output.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl StderrProgressReporter {
    const TEMPLATE: &'static str =
        "   {spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% - {msg}";

    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
        }
    }

    fn get_or_create_progress_bar(&self) -> ProgressBar {
        let mut pb_option = self
            .progress_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pb_option
            .get_or_insert_with(|| {
                let style = ProgressStyle::default_bar()
                    .template(Self::TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-");
                let pb = ProgressBar::new(100);
                pb.set_style(style);
                pb
            })
            .clone()
    }

    fn finish(&self) {
        let mut pb_option = self
            .progress_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = pb_option.take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report_progress(&self, percent: u8, message: &str) {
        let pb = self.get_or_create_progress_bar();
        pb.set_position(u64::from(percent.min(100)));
        pb.set_message(message.to_string());
    }

    fn report_error(&self, message: &str) {
        self.finish();
        eprintln!("{}", message);
    }

    fn report_completion(&self, message: &str) {
        self.finish();
        eprintln!();
        eprintln!("{}", message);
    }
}
