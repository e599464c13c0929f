use crate::bom_import::domain::{ImportPhase, Project, ProjectHint, ProjectVersion};
use crate::ports::outbound::{GraphStore, ProjectLookup};
use crate::shared::error::ImportError;
use chrono::{DateTime, Utc};

/// Outcome of resolving the target project
#[derive(Debug, Clone)]
pub struct ProjectResolution {
    pub project: Project,
    /// True when no project matched and a new one was created
    pub created: bool,
    /// Number of projects that matched; above 1 the first one was taken
    pub matches: usize,
}

impl ProjectResolution {
    pub fn is_ambiguous(&self) -> bool {
        self.matches > 1
    }
}

/// Outcome of resolving the target project version
#[derive(Debug, Clone)]
pub struct VersionResolution {
    pub project_version: ProjectVersion,
    /// Ids of the versions with the same version string that were deleted
    pub replaced: Vec<String>,
}

/// Finds or creates the project and its version for one import.
///
/// Reimporting a version string that already exists deletes the existing
/// version (and with it its components and edges) and creates a fresh one,
/// so the new import fully replaces the old subgraph.
pub struct ProjectVersionResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ProjectVersionResolver<'a, S>
where
    S: GraphStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Looks the project up by id when the hint has one, by name otherwise.
    ///
    /// With no match a project is created from the hint's name; an id-only
    /// hint that matches nothing cannot create one.
    pub async fn resolve_project(&self, hint: &ProjectHint) -> Result<ProjectResolution, ImportError> {
        let id = non_blank(hint.id.as_deref());
        let name = non_blank(hint.name.as_deref());

        let lookup = match (id, name) {
            (Some(id), _) => ProjectLookup::ById(id.to_string()),
            (None, Some(name)) => ProjectLookup::ByName(name.to_string()),
            (None, None) => return Err(ImportError::MissingProjectOrVersion),
        };

        let mut found = self
            .store
            .find_projects(&lookup)
            .await
            .map_err(|e| ImportError::store_write(ImportPhase::ResolveProjectVersion, e))?;

        let matches = found.len();
        if matches > 1 {
            tracing::warn!(
                ?lookup,
                matches,
                chosen = %found[0].id,
                "multiple projects match, using the first one"
            );
        }

        if matches > 0 {
            let project = found.swap_remove(0);
            return Ok(ProjectResolution {
                project,
                created: false,
                matches,
            });
        }

        let name = name.ok_or(ImportError::MissingProjectOrVersion)?;
        let project = self
            .store
            .create_project(name)
            .await
            .map_err(|e| ImportError::store_write(ImportPhase::ResolveProjectVersion, e))?;
        tracing::info!(project_id = %project.id, name, "created project");

        Ok(ProjectResolution {
            project,
            created: true,
            matches: 0,
        })
    }

    /// Deletes every existing version of `project` with exactly `version`,
    /// then creates a new one dated `import_date`.
    pub async fn resolve_version(
        &self,
        project: &Project,
        version: &str,
        import_date: DateTime<Utc>,
    ) -> Result<VersionResolution, ImportError> {
        let version = version.trim();
        if project.id.trim().is_empty() || version.is_empty() {
            return Err(ImportError::MissingProjectOrVersion);
        }

        let existing: Vec<String> = project
            .versions_matching(version)
            .map(|pv| pv.id.clone())
            .collect();

        for id in &existing {
            self.store
                .delete_project_version(id)
                .await
                .map_err(|e| ImportError::store_write(ImportPhase::ResolveProjectVersion, e))?;
            tracing::info!(project_version_id = %id, version, "deleted previous import of this version");
        }

        let project_version = self
            .store
            .create_project_version(&project.id, version, import_date)
            .await
            .map_err(|e| ImportError::store_write(ImportPhase::ResolveProjectVersion, e))?;

        Ok(VersionResolution {
            project_version,
            replaced: existing,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
