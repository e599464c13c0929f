use depvis_import::prelude::*;
use std::sync::{Arc, Mutex};

/// Mock ProgressReporter for testing that captures every call
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    pub progress: Arc<Mutex<Vec<(u8, String)>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
    pub completions: Arc<Mutex<Vec<String>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.progress.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.progress
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn completion_count(&self) -> usize {
        self.completions.lock().unwrap().len()
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report_progress(&self, percent: u8, message: &str) {
        self.progress
            .lock()
            .unwrap()
            .push((percent, message.to_string()));
    }

    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn report_completion(&self, message: &str) {
        self.completions.lock().unwrap().push(message.to_string());
    }
}
