use crate::shared::Result;
use serde::{Deserialize, Serialize};

/// CVSS base score, validated to the 0.0..=10.0 range
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct CvssScore(f32);

impl CvssScore {
    pub fn new(value: f32) -> Result<Self> {
        if !(0.0..=10.0).contains(&value) {
            anyhow::bail!("CVSS score must be between 0.0 and 10.0, got {}", value);
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for CvssScore {
    type Error = anyhow::Error;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CvssScore> for f32 {
    fn from(score: CvssScore) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VulnerabilityReference {
    pub url: String,
}

/// A known vulnerability as reported by the feed.
///
/// `identifier` (e.g. `CVE-2023-1234`, `GHSA-...`) is the singleton key in
/// the store: every affected component links to the same node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub identifier: String,
    #[serde(default)]
    pub cvss_score: Option<CvssScore>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub references: Vec<VulnerabilityReference>,
}

impl Vulnerability {
    pub fn new(identifier: impl Into<String>, cvss_score: Option<CvssScore>) -> Result<Self> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            anyhow::bail!("Vulnerability identifier cannot be empty");
        }
        Ok(Self {
            identifier,
            cvss_score,
            summary: None,
            references: Vec::new(),
        })
    }

    /// Adds reference URLs, skipping ones already present
    pub fn with_references<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for url in urls {
            let url = url.into();
            if !self.references.iter().any(|r| r.url == url) {
                self.references.push(VulnerabilityReference { url });
            }
        }
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }
}
