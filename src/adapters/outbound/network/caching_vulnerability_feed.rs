use crate::bom_import::domain::Vulnerability;
use crate::ports::outbound::VulnerabilityFeed;
use crate::shared::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// CachingVulnerabilityFeed wraps a VulnerabilityFeed and adds in-memory caching.
///
/// Answers are cached per purl for the lifetime of the decorator, so a purl
/// shared by several imports in one process is looked up once. Failed
/// lookups are not cached.
pub struct CachingVulnerabilityFeed<F: VulnerabilityFeed> {
    inner: F,
    cache: Arc<DashMap<String, Vec<Vulnerability>>>,
}

impl<F: VulnerabilityFeed> CachingVulnerabilityFeed<F> {
    /// Creates a new caching feed wrapping the given inner feed
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Returns the current cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<F: VulnerabilityFeed> VulnerabilityFeed for CachingVulnerabilityFeed<F> {
    async fn fetch_vulnerabilities(&self, purl: &str) -> Result<Vec<Vulnerability>> {
        if let Some(cached) = self.cache.get(purl) {
            return Ok(cached.clone());
        }

        let vulnerabilities = self.inner.fetch_vulnerabilities(purl).await?;
        self.cache.insert(purl.to_string(), vulnerabilities.clone());

        Ok(vulnerabilities)
    }
}
