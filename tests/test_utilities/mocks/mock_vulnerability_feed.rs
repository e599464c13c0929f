use async_trait::async_trait;
use depvis_import::bom_import::domain::CvssScore;
use depvis_import::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Mock VulnerabilityFeed for testing
#[derive(Default, Clone)]
pub struct MockVulnerabilityFeed {
    answers: HashMap<String, Vec<Vulnerability>>,
    failing: HashSet<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockVulnerabilityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `purl` with one vulnerability per identifier
    pub fn with_vulnerabilities(mut self, purl: &str, identifiers: &[&str]) -> Self {
        let vulnerabilities = identifiers
            .iter()
            .map(|id| {
                Vulnerability::new(*id, Some(CvssScore::new(7.5).unwrap()))
                    .unwrap()
                    .with_references([format!("https://osv.dev/vulnerability/{}", id)])
            })
            .collect();
        self.answers.insert(purl.to_string(), vulnerabilities);
        self
    }

    /// Lookups of `purl` fail
    pub fn with_failure(mut self, purl: &str) -> Self {
        self.failing.insert(purl.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VulnerabilityFeed for MockVulnerabilityFeed {
    async fn fetch_vulnerabilities(&self, purl: &str) -> Result<Vec<Vulnerability>> {
        self.calls.lock().unwrap().push(purl.to_string());
        if self.failing.contains(purl) {
            anyhow::bail!("Mock vulnerability feed failure for {}", purl);
        }
        Ok(self.answers.get(purl).cloned().unwrap_or_default())
    }
}
