use crate::ports::outbound::GraphStore;
use crate::shared::Result;

/// Ledger of what one import run wrote to the store.
///
/// The store has no transaction spanning the import, so the run keeps
/// track of its own writes. Compensation removes the project version this
/// run created, which cascades to its components and edges. Projects and
/// vulnerability nodes outlive any single import and are never removed;
/// a version replaced earlier in the run is gone for good.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSaga {
    created_project: Option<String>,
    created_project_version: Option<String>,
    replaced_versions: Vec<String>,
    components_created: usize,
    relationships_created: usize,
}

impl ImportSaga {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_project_created(&mut self, project_id: impl Into<String>) {
        self.created_project = Some(project_id.into());
    }

    pub fn record_versions_replaced(&mut self, ids: &[String]) {
        self.replaced_versions.extend_from_slice(ids);
    }

    pub fn record_project_version_created(&mut self, project_version_id: impl Into<String>) {
        self.created_project_version = Some(project_version_id.into());
    }

    pub fn record_components(&mut self, count: usize) {
        self.components_created += count;
    }

    pub fn record_relationships(&mut self, count: usize) {
        self.relationships_created += count;
    }

    /// True when the run left data in the store that compensation could remove
    pub fn has_writes(&self) -> bool {
        self.created_project_version.is_some()
    }

    /// Deletes the project version created by this run.
    ///
    /// Returns the id of the deleted version, or `None` when the run never
    /// got as far as creating one.
    pub async fn compensate<S>(&mut self, store: &S) -> Result<Option<String>>
    where
        S: GraphStore + ?Sized,
    {
        let Some(id) = self.created_project_version.take() else {
            return Ok(None);
        };

        tracing::warn!(
            project_version_id = %id,
            created_project = ?self.created_project,
            components = self.components_created,
            relationships = self.relationships_created,
            "removing partially imported project version"
        );
        if let Err(e) = store.delete_project_version(&id).await {
            self.created_project_version = Some(id);
            return Err(e);
        }

        if !self.replaced_versions.is_empty() {
            tracing::warn!(
                replaced = ?self.replaced_versions,
                "replaced project versions cannot be restored"
            );
        }
        self.components_created = 0;
        self.relationships_created = 0;
        Ok(Some(id))
    }
}
