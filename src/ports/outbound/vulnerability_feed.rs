use crate::bom_import::domain::Vulnerability;
use crate::shared::Result;
use async_trait::async_trait;

/// VulnerabilityFeed port for fetching known vulnerabilities of a package
///
/// The feed answers one package URL at a time; batching is the caller's job.
#[async_trait]
pub trait VulnerabilityFeed: Send + Sync {
    /// Fetches vulnerabilities affecting the package identified by `purl`
    ///
    /// # Returns
    /// An empty list when the package has no known vulnerabilities
    ///
    /// # Errors
    /// Returns an error if:
    /// - The purl is not a valid package URL
    /// - The network request fails or the feed answers with an error status
    /// - The response cannot be parsed
    async fn fetch_vulnerabilities(&self, purl: &str) -> Result<Vec<Vulnerability>>;
}
