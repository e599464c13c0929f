use crate::bom_import::domain::{CvssScore, Vulnerability};
use crate::ports::outbound::VulnerabilityFeed;
use crate::shared::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// OSV API client for fetching vulnerability data by package URL
///
/// Uses the OSV.dev Query API, which answers with full vulnerability
/// records for one package. Long answers are paged; every page is fetched.
///
/// # Security
/// - Implements timeout (30 seconds)
/// - Does not retry failed requests (a failed lookup is reported per component)
pub struct OsvClient {
    client: Client,
    api_url: String,
}

impl OsvClient {
    pub const DEFAULT_API_URL: &'static str = "https://api.osv.dev";
    const TIMEOUT_SECONDS: u64 = 30;
    /// Guard against a server that keeps handing out page tokens
    const MAX_PAGES: usize = 20;

    /// Creates a new OSV API client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_api_url(Self::DEFAULT_API_URL)
    }

    /// Creates a client against another OSV-compatible server (mirrors, tests)
    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("depvis-import/{}", version);
        let client = Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECONDS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn query_page(&self, query: &OsvQuery<'_>) -> Result<OsvQueryResponse> {
        let url = format!("{}/v1/query", self.api_url);
        let response = self.client.post(&url).json(query).send().await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "OSV API returned status code {} for {}",
                response.status(),
                query.package.purl
            );
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VulnerabilityFeed for OsvClient {
    async fn fetch_vulnerabilities(&self, purl: &str) -> Result<Vec<Vulnerability>> {
        if !purl.starts_with("pkg:") {
            anyhow::bail!("'{}' is not a package URL", purl);
        }

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        for _ in 0..Self::MAX_PAGES {
            let query = OsvQuery {
                package: OsvPackage { purl },
                page_token: page_token.as_deref(),
            };
            let page = self.query_page(&query).await?;
            records.extend(page.vulns);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(purl, vulnerabilities = records.len(), "OSV lookup finished");
        Ok(records.iter().filter_map(convert_to_vulnerability).collect())
    }
}

/// Converts a single OSV record to the domain model
fn convert_to_vulnerability(record: &OsvVulnerability) -> Option<Vulnerability> {
    // CVSS_V3 first, then CVSS_V4
    let cvss_score = record
        .severity
        .iter()
        .find(|s| s.severity_type == "CVSS_V3")
        .or_else(|| record.severity.iter().find(|s| s.severity_type == "CVSS_V4"))
        .and_then(|s| parse_cvss_score(&s.score));

    match Vulnerability::new(record.id.clone(), cvss_score) {
        Ok(vulnerability) => Some(
            vulnerability
                .with_summary(record.summary.clone())
                .with_references(record.references.iter().map(|r| r.url.clone())),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "skipping OSV record");
            None
        }
    }
}

// OSV API request/response structures

#[derive(Debug, Serialize)]
struct OsvQuery<'a> {
    package: OsvPackage<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OsvPackage<'a> {
    purl: &'a str,
}

#[derive(Debug, Deserialize)]
struct OsvQueryResponse {
    #[serde(default)]
    vulns: Vec<OsvVulnerability>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerability {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    severity: Vec<OsvSeverity>,
    #[serde(default)]
    references: Vec<OsvReference>,
}

#[derive(Debug, Deserialize)]
struct OsvSeverity {
    #[serde(rename = "type")]
    severity_type: String, // "CVSS_V3"
    score: String, // e.g., "CVSS:3.1/AV:N/AC:L/..."
}

#[derive(Debug, Deserialize)]
struct OsvReference {
    url: String,
}

/// Computes the CVSS v3 base score from a vector string
///
/// Example: "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H" -> Some(9.8)
///
/// Vectors of other CVSS versions, or with missing metrics, yield `None`.
fn parse_cvss_score(cvss_vector: &str) -> Option<CvssScore> {
    let mut parts = cvss_vector.split('/');
    if !parts.next()?.starts_with("CVSS:3") {
        return None;
    }
    let metrics: HashMap<&str, &str> = parts
        .filter_map(|part| part.split_once(':'))
        .collect();

    let scope_changed = match *metrics.get("S")? {
        "U" => false,
        "C" => true,
        _ => return None,
    };

    let av = match *metrics.get("AV")? {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        _ => return None,
    };
    let ac = match *metrics.get("AC")? {
        "L" => 0.77,
        "H" => 0.44,
        _ => return None,
    };
    let pr = match (*metrics.get("PR")?, scope_changed) {
        ("N", _) => 0.85,
        ("L", false) => 0.62,
        ("L", true) => 0.68,
        ("H", false) => 0.27,
        ("H", true) => 0.5,
        _ => return None,
    };
    let ui = match *metrics.get("UI")? {
        "N" => 0.85,
        "R" => 0.62,
        _ => return None,
    };
    let impact_of = |metric: &str| -> Option<f64> {
        match *metrics.get(metric)? {
            "N" => Some(0.0),
            "L" => Some(0.22),
            "H" => Some(0.56),
            _ => None,
        }
    };
    let (c, i, a) = (impact_of("C")?, impact_of("I")?, impact_of("A")?);

    let iss = 1.0_f64 - ((1.0 - c) * (1.0 - i) * (1.0 - a));
    let impact = if scope_changed {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02_f64).powi(15)
    } else {
        6.42 * iss
    };
    let exploitability = 8.22 * av * ac * pr * ui;

    let base_score = if impact <= 0.0 {
        0.0
    } else if scope_changed {
        f64::min(1.08 * (impact + exploitability), 10.0)
    } else {
        f64::min(impact + exploitability, 10.0)
    };

    // Round up to one decimal place
    let rounded = (base_score * 10.0).ceil() / 10.0;
    CvssScore::new(rounded as f32).ok()
}
