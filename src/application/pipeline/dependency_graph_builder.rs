use super::batch_writer::BatchWriter;
use crate::bom_import::domain::{Component, CreatedComponent, DependencyDecl, ImportPhase};
use crate::ports::outbound::{DependencyLink, GraphStore, ProgressReporter};
use crate::shared::error::ImportError;
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;

/// Totals of the edge phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSummary {
    /// Dependency entries sent to the store
    pub links: usize,
    pub relationships_created: usize,
    /// Targets (or sources) that were not created in the node phase
    pub dangling_references: usize,
}

/// Writes components and then dependency edges for one project version.
///
/// Every store call carries the project version id: a purl only identifies
/// a component inside one version.
pub struct DependencyGraphBuilder<'a, S: ?Sized> {
    store: &'a S,
    project_version_id: &'a str,
    component_chunk_size: usize,
    dependency_chunk_size: usize,
    cancellation: &'a CancellationToken,
}

impl<'a, S> DependencyGraphBuilder<'a, S>
where
    S: GraphStore + ?Sized,
{
    pub fn new(store: &'a S, project_version_id: &'a str, cancellation: &'a CancellationToken) -> Self {
        Self {
            store,
            project_version_id,
            component_chunk_size: 5,
            dependency_chunk_size: 100,
            cancellation,
        }
    }

    pub fn with_chunk_sizes(mut self, components: usize, dependencies: usize) -> Self {
        self.component_chunk_size = components;
        self.dependency_chunk_size = dependencies;
        self
    }

    /// Node phase: creates every component, in order
    pub async fn create_nodes(
        &self,
        components: &[Component],
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<CreatedComponent>, ImportError> {
        let store = self.store;
        let project_version_id = self.project_version_id;

        BatchWriter::new(ImportPhase::CreateComponents, self.component_chunk_size)
            .with_cancellation(self.cancellation)
            .run(components, progress, |_, chunk| {
                store.create_components(chunk, project_version_id)
            })
            .await
    }

    /// Edge phase: connects each declared source to its targets.
    ///
    /// All links of a chunk go to the store in one round-trip, each under
    /// its own alias (`link_<index>`). A failed alias fails the chunk and is
    /// reported with its source purl. References to purls that were not
    /// created produce no edge and are only counted.
    pub async fn link_dependencies(
        &self,
        dependencies: &[DependencyDecl],
        created: &[CreatedComponent],
        progress: &dyn ProgressReporter,
    ) -> Result<LinkSummary, ImportError> {
        let known: HashSet<&str> = created.iter().map(|c| c.purl.as_str()).collect();

        let links: Vec<DependencyLink> = dependencies
            .iter()
            .filter(|dep| !dep.depends_on.is_empty())
            .enumerate()
            .map(|(index, dep)| DependencyLink {
                alias: format!("link_{}", index),
                source_purl: dep.purl.clone(),
                target_purls: dep.depends_on.clone(),
            })
            .collect();

        let dangling_references: usize = links
            .iter()
            .map(|link| {
                let source = usize::from(!known.contains(link.source_purl.as_str()));
                let targets = link
                    .target_purls
                    .iter()
                    .filter(|purl| !known.contains(purl.as_str()))
                    .count();
                source + targets
            })
            .sum();
        if dangling_references > 0 {
            tracing::debug!(
                dangling_references,
                "some dependency references match no component of this version"
            );
        }

        let store = self.store;
        let project_version_id = self.project_version_id;
        let counts = BatchWriter::new(ImportPhase::LinkDependencies, self.dependency_chunk_size)
            .with_cancellation(self.cancellation)
            .run(&links, progress, |_, chunk| async move {
                let outcomes = store.connect_dependencies(chunk, project_version_id).await?;
                let sources: HashMap<&str, &str> = chunk
                    .iter()
                    .map(|link| (link.alias.as_str(), link.source_purl.as_str()))
                    .collect();

                let failures: Vec<String> = outcomes
                    .iter()
                    .filter_map(|outcome| {
                        outcome.error.as_ref().map(|error| {
                            let source = sources.get(outcome.alias.as_str()).copied().unwrap_or("?");
                            format!("{} ({}): {}", outcome.alias, source, error)
                        })
                    })
                    .collect();
                if !failures.is_empty() {
                    anyhow::bail!("dependency update failed for {}", failures.join("; "));
                }

                Ok::<_, anyhow::Error>(
                    outcomes
                        .iter()
                        .map(|outcome| outcome.relationships_created)
                        .collect::<Vec<_>>(),
                )
            })
            .await?;

        Ok(LinkSummary {
            links: links.len(),
            relationships_created: counts.iter().sum(),
            dangling_references,
        })
    }
}
