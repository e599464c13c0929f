use crate::bom_import::domain::{Component, CreatedComponent, Project, ProjectVersion, Vulnerability};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// How to look a project up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLookup {
    ById(String),
    ByName(String),
}

/// One aliased sub-operation of a combined dependency update:
/// connect `source_purl` to every component matching `target_purls`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLink {
    pub alias: String,
    pub source_purl: String,
    pub target_purls: Vec<String>,
}

/// Result of one aliased sub-operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub alias: String,
    pub relationships_created: usize,
    /// Set when this sub-operation failed while others in the round-trip may not have
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VulnerabilityUpsert {
    pub id: String,
    /// False when an existing node with the same identifier was reused
    pub created: bool,
}

/// A component edge as stored, expressed by purls
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyEdge {
    pub source_purl: String,
    pub target_purl: String,
}

/// GraphStore port for the persistent project graph
///
/// This port abstracts the graph database holding projects, their versions,
/// components, dependency edges and vulnerabilities. Every component-level
/// operation is scoped by a project version id because a purl is only
/// unique inside one version.
///
/// The store is not transactional across calls; callers must assume that
/// every successful call is persisted.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Finds projects (with their versions) by exact id or exact name,
    /// in creation order
    async fn find_projects(&self, lookup: &ProjectLookup) -> Result<Vec<Project>>;

    async fn create_project(&self, name: &str) -> Result<Project>;

    async fn create_project_version(
        &self,
        project_id: &str,
        version: &str,
        import_date: DateTime<Utc>,
    ) -> Result<ProjectVersion>;

    /// Deletes a project version together with its components and edges
    async fn delete_project_version(&self, project_version_id: &str) -> Result<()>;

    /// Creates components owned by the project version, returning them in input order
    async fn create_components(
        &self,
        components: &[Component],
        project_version_id: &str,
    ) -> Result<Vec<CreatedComponent>>;

    /// Applies several dependency updates in one round-trip
    ///
    /// Targets that match no component in the version produce no edge and no error.
    async fn connect_dependencies(
        &self,
        links: &[DependencyLink],
        project_version_id: &str,
    ) -> Result<Vec<LinkOutcome>>;

    /// Connect-or-create by identifier; reference URLs are connect-or-create by URL
    async fn upsert_vulnerability(&self, vulnerability: &Vulnerability) -> Result<VulnerabilityUpsert>;

    async fn connect_vulnerability_to_component(
        &self,
        vulnerability_id: &str,
        component_purl: &str,
        project_version_id: &str,
    ) -> Result<()>;

    async fn components_of(&self, project_version_id: &str) -> Result<Vec<Component>>;

    async fn dependencies_of(&self, project_version_id: &str) -> Result<Vec<DependencyEdge>>;

    /// (component purl, vulnerability) pairs for the version
    async fn vulnerabilities_of(
        &self,
        project_version_id: &str,
    ) -> Result<Vec<(String, Vulnerability)>>;
}
