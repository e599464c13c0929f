use crate::bom_import::domain::{
    Component, CreatedComponent, CvssScore, Project, ProjectVersion, Vulnerability,
    VulnerabilityReference,
};
use crate::ports::outbound::{
    DependencyEdge, DependencyLink, GraphStore, LinkOutcome, ProjectLookup, VulnerabilityUpsert,
};
use crate::shared::error::ImportError;
use crate::shared::security::{validate_input_file, validate_output_path, MAX_SNAPSHOT_SIZE};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectRecord {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectVersionRecord {
    id: String,
    project_id: String,
    version: String,
    import_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ComponentRecord {
    id: String,
    project_version_id: String,
    #[serde(flatten)]
    component: Component,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EdgeRecord {
    project_version_id: String,
    source_id: String,
    target_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VulnerabilityRecord {
    id: String,
    identifier: String,
    #[serde(default)]
    cvss_score: Option<CvssScore>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    reference_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReferenceRecord {
    id: String,
    url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AffectsRecord {
    vulnerability_id: String,
    component_id: String,
}

/// Whole graph, in insertion order. This is also the snapshot file format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct GraphData {
    #[serde(default)]
    projects: Vec<ProjectRecord>,
    #[serde(default)]
    project_versions: Vec<ProjectVersionRecord>,
    #[serde(default)]
    components: Vec<ComponentRecord>,
    #[serde(default)]
    dependencies: Vec<EdgeRecord>,
    #[serde(default)]
    vulnerabilities: Vec<VulnerabilityRecord>,
    #[serde(default)]
    references: Vec<ReferenceRecord>,
    #[serde(default)]
    affects: Vec<AffectsRecord>,
}

impl GraphData {
    fn project(&self, record: &ProjectRecord) -> Project {
        Project {
            id: record.id.clone(),
            name: record.name.clone(),
            versions: self
                .project_versions
                .iter()
                .filter(|pv| pv.project_id == record.id)
                .map(|pv| ProjectVersion {
                    id: pv.id.clone(),
                    version: pv.version.clone(),
                    import_date: pv.import_date,
                })
                .collect(),
        }
    }

    fn ensure_version(&self, project_version_id: &str) -> Result<()> {
        if !self.project_versions.iter().any(|pv| pv.id == project_version_id) {
            anyhow::bail!("project version {} does not exist", project_version_id);
        }
        Ok(())
    }

    /// Component ids of one version keyed by purl
    fn component_ids(&self, project_version_id: &str) -> HashMap<&str, &str> {
        self.components
            .iter()
            .filter(|c| c.project_version_id == project_version_id)
            .map(|c| (c.component.purl.as_str(), c.id.as_str()))
            .collect()
    }

    fn vulnerability(&self, record: &VulnerabilityRecord) -> Vulnerability {
        let references = record
            .reference_ids
            .iter()
            .filter_map(|id| self.references.iter().find(|r| &r.id == id))
            .map(|r| VulnerabilityReference { url: r.url.clone() })
            .collect();
        Vulnerability {
            identifier: record.identifier.clone(),
            cvss_score: record.cvss_score,
            summary: record.summary.clone(),
            references,
        }
    }

    /// Connect-or-create a reference node by URL
    fn reference_id(&mut self, url: &str) -> String {
        if let Some(existing) = self.references.iter().find(|r| r.url == url) {
            return existing.id.clone();
        }
        let id = new_id();
        self.references.push(ReferenceRecord {
            id: id.clone(),
            url: url.to_string(),
        });
        id
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// InMemoryGraphStore adapter implementing the GraphStore port
///
/// Keeps the project graph in memory behind a mutex. Every operation runs
/// under the lock, so an upsert by identifier cannot race with another one.
/// The graph can be loaded from and saved to a JSON snapshot so the CLI can
/// keep state between runs.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    data: Mutex<GraphData>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot; a missing file gives an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no store snapshot yet, starting empty");
            return Ok(Self::new());
        }

        validate_input_file(path, "store snapshot", MAX_SNAPSHOT_SIZE)?;
        let content = fs::read_to_string(path).map_err(|e| ImportError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        let data: GraphData =
            serde_json::from_str(&content).map_err(|e| ImportError::FileReadError {
                path: path.to_path_buf(),
                details: format!("invalid store snapshot: {}", e),
            })?;

        tracing::debug!(
            path = %path.display(),
            projects = data.projects.len(),
            components = data.components.len(),
            "store snapshot loaded"
        );
        Ok(Self {
            data: Mutex::new(data),
        })
    }

    /// Writes the whole graph as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        validate_output_path(path)?;
        let json = {
            let data = self.lock()?;
            serde_json::to_string_pretty(&*data)?
        };
        fs::write(path, json).map_err(|e| ImportError::FileWriteError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        Ok(())
    }

    pub fn project_count(&self) -> usize {
        self.peek().projects.len()
    }

    pub fn project_version_count(&self) -> usize {
        self.peek().project_versions.len()
    }

    pub fn component_count(&self) -> usize {
        self.peek().components.len()
    }

    pub fn vulnerability_count(&self) -> usize {
        self.peek().vulnerabilities.len()
    }

    pub fn reference_count(&self) -> usize {
        self.peek().references.len()
    }

    fn lock(&self) -> Result<MutexGuard<'_, GraphData>> {
        self.data
            .lock()
            .map_err(|_| anyhow::anyhow!("graph store lock poisoned"))
    }

    /// Read-only access for counters; tolerates a poisoned lock
    fn peek(&self) -> MutexGuard<'_, GraphData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn find_projects(&self, lookup: &ProjectLookup) -> Result<Vec<Project>> {
        let data = self.lock()?;
        Ok(data
            .projects
            .iter()
            .filter(|p| match lookup {
                ProjectLookup::ById(id) => &p.id == id,
                ProjectLookup::ByName(name) => &p.name == name,
            })
            .map(|p| data.project(p))
            .collect())
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        if name.trim().is_empty() {
            anyhow::bail!("project name cannot be empty");
        }
        let mut data = self.lock()?;
        let record = ProjectRecord {
            id: new_id(),
            name: name.to_string(),
        };
        data.projects.push(record.clone());
        Ok(Project::new(record.id, record.name))
    }

    async fn create_project_version(
        &self,
        project_id: &str,
        version: &str,
        import_date: DateTime<Utc>,
    ) -> Result<ProjectVersion> {
        let mut data = self.lock()?;
        if !data.projects.iter().any(|p| p.id == project_id) {
            anyhow::bail!("project {} does not exist", project_id);
        }
        let record = ProjectVersionRecord {
            id: new_id(),
            project_id: project_id.to_string(),
            version: version.to_string(),
            import_date,
        };
        data.project_versions.push(record.clone());
        Ok(ProjectVersion {
            id: record.id,
            version: record.version,
            import_date: record.import_date,
        })
    }

    async fn delete_project_version(&self, project_version_id: &str) -> Result<()> {
        let mut data = self.lock()?;
        data.ensure_version(project_version_id)?;

        let component_ids: Vec<String> = data
            .components
            .iter()
            .filter(|c| c.project_version_id == project_version_id)
            .map(|c| c.id.clone())
            .collect();

        data.project_versions.retain(|pv| pv.id != project_version_id);
        data.components
            .retain(|c| c.project_version_id != project_version_id);
        data.dependencies
            .retain(|e| e.project_version_id != project_version_id);
        data.affects
            .retain(|a| !component_ids.contains(&a.component_id));
        Ok(())
    }

    async fn create_components(
        &self,
        components: &[Component],
        project_version_id: &str,
    ) -> Result<Vec<CreatedComponent>> {
        let mut data = self.lock()?;
        data.ensure_version(project_version_id)?;

        let mut created = Vec::with_capacity(components.len());
        for component in components {
            if data.components.iter().any(|c| {
                c.project_version_id == project_version_id && c.component.purl == component.purl
            }) {
                anyhow::bail!(
                    "component {} already exists in project version {}",
                    component.purl,
                    project_version_id
                );
            }
            let record = ComponentRecord {
                id: new_id(),
                project_version_id: project_version_id.to_string(),
                component: component.clone(),
            };
            created.push(CreatedComponent {
                id: record.id.clone(),
                purl: component.purl.clone(),
            });
            data.components.push(record);
        }
        Ok(created)
    }

    async fn connect_dependencies(
        &self,
        links: &[DependencyLink],
        project_version_id: &str,
    ) -> Result<Vec<LinkOutcome>> {
        let mut data = self.lock()?;
        data.ensure_version(project_version_id)?;

        let mut new_edges = Vec::new();
        let mut outcomes = Vec::with_capacity(links.len());
        {
            let ids = data.component_ids(project_version_id);
            for link in links {
                let mut relationships_created = 0;
                if let Some(source_id) = ids.get(link.source_purl.as_str()) {
                    for target in &link.target_purls {
                        let Some(target_id) = ids.get(target.as_str()) else {
                            continue;
                        };
                        let edge = EdgeRecord {
                            project_version_id: project_version_id.to_string(),
                            source_id: source_id.to_string(),
                            target_id: target_id.to_string(),
                        };
                        if !data.dependencies.contains(&edge) && !new_edges.contains(&edge) {
                            new_edges.push(edge);
                            relationships_created += 1;
                        }
                    }
                }
                outcomes.push(LinkOutcome {
                    alias: link.alias.clone(),
                    relationships_created,
                    error: None,
                });
            }
        }
        data.dependencies.extend(new_edges);
        Ok(outcomes)
    }

    async fn upsert_vulnerability(&self, vulnerability: &Vulnerability) -> Result<VulnerabilityUpsert> {
        let mut data = self.lock()?;
        let reference_ids: Vec<String> = vulnerability
            .references
            .iter()
            .map(|r| data.reference_id(&r.url))
            .collect();

        if let Some(existing) = data
            .vulnerabilities
            .iter_mut()
            .find(|v| v.identifier == vulnerability.identifier)
        {
            for id in reference_ids {
                if !existing.reference_ids.contains(&id) {
                    existing.reference_ids.push(id);
                }
            }
            return Ok(VulnerabilityUpsert {
                id: existing.id.clone(),
                created: false,
            });
        }

        let id = new_id();
        data.vulnerabilities.push(VulnerabilityRecord {
            id: id.clone(),
            identifier: vulnerability.identifier.clone(),
            cvss_score: vulnerability.cvss_score,
            summary: vulnerability.summary.clone(),
            reference_ids,
        });
        Ok(VulnerabilityUpsert { id, created: true })
    }

    async fn connect_vulnerability_to_component(
        &self,
        vulnerability_id: &str,
        component_purl: &str,
        project_version_id: &str,
    ) -> Result<()> {
        let mut data = self.lock()?;
        if !data.vulnerabilities.iter().any(|v| v.id == vulnerability_id) {
            anyhow::bail!("vulnerability {} does not exist", vulnerability_id);
        }
        let component_id = data
            .component_ids(project_version_id)
            .get(component_purl)
            .map(|id| id.to_string())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "component {} not found in project version {}",
                    component_purl,
                    project_version_id
                )
            })?;

        let record = AffectsRecord {
            vulnerability_id: vulnerability_id.to_string(),
            component_id,
        };
        if !data.affects.contains(&record) {
            data.affects.push(record);
        }
        Ok(())
    }

    async fn components_of(&self, project_version_id: &str) -> Result<Vec<Component>> {
        let data = self.lock()?;
        Ok(data
            .components
            .iter()
            .filter(|c| c.project_version_id == project_version_id)
            .map(|c| c.component.clone())
            .collect())
    }

    async fn dependencies_of(&self, project_version_id: &str) -> Result<Vec<DependencyEdge>> {
        let data = self.lock()?;
        let purls: HashMap<&str, &str> = data
            .components
            .iter()
            .filter(|c| c.project_version_id == project_version_id)
            .map(|c| (c.id.as_str(), c.component.purl.as_str()))
            .collect();

        let mut edges: Vec<DependencyEdge> = data
            .dependencies
            .iter()
            .filter(|e| e.project_version_id == project_version_id)
            .filter_map(|e| {
                Some(DependencyEdge {
                    source_purl: purls.get(e.source_id.as_str())?.to_string(),
                    target_purl: purls.get(e.target_id.as_str())?.to_string(),
                })
            })
            .collect();
        edges.sort();
        Ok(edges)
    }

    async fn vulnerabilities_of(
        &self,
        project_version_id: &str,
    ) -> Result<Vec<(String, Vulnerability)>> {
        let data = self.lock()?;
        let mut pairs = Vec::new();
        for component in data
            .components
            .iter()
            .filter(|c| c.project_version_id == project_version_id)
        {
            for affects in data.affects.iter().filter(|a| a.component_id == component.id) {
                if let Some(record) = data
                    .vulnerabilities
                    .iter()
                    .find(|v| v.id == affects.vulnerability_id)
                {
                    pairs.push((component.component.purl.clone(), data.vulnerability(record)));
                }
            }
        }
        Ok(pairs)
    }
}
