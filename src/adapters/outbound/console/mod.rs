/// Console adapters for user-facing terminal output
mod progress_reporter;

pub use progress_reporter::StderrProgressReporter;
