use async_trait::async_trait;
use chrono::{DateTime, Utc};
use depvis_import::bom_import::domain::CreatedComponent;
use depvis_import::ports::outbound::{
    DependencyEdge, DependencyLink, LinkOutcome, ProjectLookup, VulnerabilityUpsert,
};
use depvis_import::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Where the wrapped store starts failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailPoint {
    /// `create_components` succeeds this many times, then fails
    CreateComponentsAfter(usize),
    /// Every `connect_dependencies` round-trip fails
    ConnectDependencies,
    /// The link whose source is this purl reports an error inside an otherwise good round-trip
    LinkSource(String),
    /// Every `upsert_vulnerability` fails
    UpsertVulnerability,
}

/// GraphStore wrapper that injects failures into an InMemoryGraphStore
pub struct FailingGraphStore {
    inner: InMemoryGraphStore,
    fail_point: FailPoint,
    create_calls: AtomicUsize,
}

impl FailingGraphStore {
    pub fn new(inner: InMemoryGraphStore, fail_point: FailPoint) -> Self {
        Self {
            inner,
            fail_point,
            create_calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &InMemoryGraphStore {
        &self.inner
    }
}

#[async_trait]
impl GraphStore for FailingGraphStore {
    async fn find_projects(&self, lookup: &ProjectLookup) -> Result<Vec<Project>> {
        self.inner.find_projects(lookup).await
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        self.inner.create_project(name).await
    }

    async fn create_project_version(
        &self,
        project_id: &str,
        version: &str,
        import_date: DateTime<Utc>,
    ) -> Result<ProjectVersion> {
        self.inner
            .create_project_version(project_id, version, import_date)
            .await
    }

    async fn delete_project_version(&self, project_version_id: &str) -> Result<()> {
        self.inner.delete_project_version(project_version_id).await
    }

    async fn create_components(
        &self,
        components: &[Component],
        project_version_id: &str,
    ) -> Result<Vec<CreatedComponent>> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let FailPoint::CreateComponentsAfter(limit) = self.fail_point {
            if call >= limit {
                anyhow::bail!("Mock store failure: connection lost");
            }
        }
        self.inner
            .create_components(components, project_version_id)
            .await
    }

    async fn connect_dependencies(
        &self,
        links: &[DependencyLink],
        project_version_id: &str,
    ) -> Result<Vec<LinkOutcome>> {
        match &self.fail_point {
            FailPoint::ConnectDependencies => {
                anyhow::bail!("Mock store failure: dependency update rejected")
            }
            FailPoint::LinkSource(purl) => {
                let good: Vec<DependencyLink> = links
                    .iter()
                    .filter(|l| &l.source_purl != purl)
                    .cloned()
                    .collect();
                let mut outcomes = self
                    .inner
                    .connect_dependencies(&good, project_version_id)
                    .await?;
                outcomes.extend(links.iter().filter(|l| &l.source_purl == purl).map(|l| {
                    LinkOutcome {
                        alias: l.alias.clone(),
                        relationships_created: 0,
                        error: Some("constraint violation".to_string()),
                    }
                }));
                Ok(outcomes)
            }
            _ => {
                self.inner
                    .connect_dependencies(links, project_version_id)
                    .await
            }
        }
    }

    async fn upsert_vulnerability(&self, vulnerability: &Vulnerability) -> Result<VulnerabilityUpsert> {
        if self.fail_point == FailPoint::UpsertVulnerability {
            anyhow::bail!("Mock store failure: vulnerability write rejected");
        }
        self.inner.upsert_vulnerability(vulnerability).await
    }

    async fn connect_vulnerability_to_component(
        &self,
        vulnerability_id: &str,
        component_purl: &str,
        project_version_id: &str,
    ) -> Result<()> {
        self.inner
            .connect_vulnerability_to_component(vulnerability_id, component_purl, project_version_id)
            .await
    }

    async fn components_of(&self, project_version_id: &str) -> Result<Vec<Component>> {
        self.inner.components_of(project_version_id).await
    }

    async fn dependencies_of(&self, project_version_id: &str) -> Result<Vec<DependencyEdge>> {
        self.inner.dependencies_of(project_version_id).await
    }

    async fn vulnerabilities_of(
        &self,
        project_version_id: &str,
    ) -> Result<Vec<(String, Vulnerability)>> {
        self.inner.vulnerabilities_of(project_version_id).await
    }
}
