use crate::application::dto::{
    EnrichmentOutcome, EnrichmentStatus, ImportOptions, ImportReport, ImportRequest,
};
use crate::application::pipeline::{
    DependencyGraphBuilder, ImportSaga, ProgressTracker, ProjectVersionResolver,
    VulnerabilityEnricher,
};
use crate::bom_import::domain::ImportPhase;
use crate::bom_import::services::BomNormalizer;
use crate::ports::inbound::SbomImportPort;
use crate::ports::outbound::{GraphStore, ProgressReporter, VulnerabilityFeed};
use crate::shared::error::ImportError;
use crate::shared::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;


/// ImportSbomUseCase - Core use case for importing an SBOM into the graph store
///
/// Runs the import phases strictly in order:
/// `Normalize → ResolveProjectVersion → CreateComponents (0-60%) →
/// LinkDependencies (60-70%) → FetchVulnerabilities (70-90%) →
/// PersistVulnerabilities (90-100%) → Complete`.
///
/// The first failing phase stops the import. Nothing is retried; what was
/// written stays in the store unless `compensate_on_failure` is set, in
/// which case the project version created by the run is deleted again.
///
/// # Type Parameters
/// * `S` - GraphStore implementation
/// * `F` - VulnerabilityFeed implementation
/// * `PR` - ProgressReporter implementation
pub struct ImportSbomUseCase<S, F, PR> {
    store: S,
    feed: F,
    progress_reporter: PR,
    options: ImportOptions,
}

impl<S, F, PR> ImportSbomUseCase<S, F, PR>
where
    S: GraphStore,
    F: VulnerabilityFeed,
    PR: ProgressReporter,
{
    /// Creates a new ImportSbomUseCase with injected dependencies and default options
    pub fn new(store: S, feed: F, progress_reporter: PR) -> Self {
        Self {
            store,
            feed,
            progress_reporter,
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn progress_reporter(&self) -> &PR {
        &self.progress_reporter
    }

    /// Executes the import
    ///
    /// # Returns
    /// ImportReport describing what was written. Errors carry an
    /// [`ImportError`] that names the failed phase.
    pub async fn execute(&self, request: ImportRequest) -> Result<ImportReport> {
        self.options.validate()?;

        let tracker = ProgressTracker::new(&self.progress_reporter);
        let mut saga = ImportSaga::new();

        match self.run(request, &tracker, &mut saga).await {
            Ok(report) => {
                tracker.report_completion(&format!(
                    "Imported {} component(s) into {} {}",
                    report.components_created,
                    report.project.name,
                    report.project_version.version
                ));
                Ok(report)
            }
            Err(err) => {
                tracing::error!(
                    phase = ?err.phase(),
                    progress = tracker.current(),
                    error = %err,
                    "import failed"
                );
                tracker.report_error(&err.to_string());
                self.fail(err, &mut saga).await
            }
        }
    }

    async fn fail(&self, err: ImportError, saga: &mut ImportSaga) -> Result<ImportReport> {
        if !self.options.compensate_on_failure || !saga.has_writes() {
            return Err(err.into());
        }

        match saga.compensate(&self.store).await {
            Ok(Some(id)) => Err(anyhow::Error::from(err)
                .context(format!("Import failed; removed partially imported project version {}", id))),
            Ok(None) => Err(err.into()),
            Err(compensation) => {
                tracing::error!(error = %compensation, "compensation failed");
                Err(anyhow::Error::from(err).context(format!(
                    "Import failed and the partial project version could not be removed: {:#}",
                    compensation
                )))
            }
        }
    }

    async fn run(
        &self,
        request: ImportRequest,
        progress: &ProgressTracker<'_>,
        saga: &mut ImportSaga,
    ) -> std::result::Result<ImportReport, ImportError> {
        let cancellation = &request.cancellation;
        let mut warnings = Vec::new();

        // Phase 1: Normalize
        let normalized = {
            let phase = self.enter(ImportPhase::Normalize, cancellation, progress)?;
            let normalized = BomNormalizer::normalize(
                &request.document,
                request.project.clone(),
                request.project_version.as_deref(),
            )?;
            tracing::info!(
                %phase,
                components = normalized.components.len(),
                dependencies = normalized.dependencies.len(),
                version = %normalized.version,
                "SBOM normalized"
            );
            normalized
        };

        // Phase 2: ResolveProjectVersion
        self.enter(ImportPhase::ResolveProjectVersion, cancellation, progress)?;
        let resolver = ProjectVersionResolver::new(&self.store);
        let project = resolver.resolve_project(&normalized.project).await?;
        if project.created {
            saga.record_project_created(&project.project.id);
        }
        if project.is_ambiguous() {
            warnings.push(format!(
                "{} projects matched '{}'; imported into the first one ({})",
                project.matches, project.project.name, project.project.id
            ));
        }
        let import_date = normalized.timestamp.unwrap_or_else(Utc::now);
        let version = resolver
            .resolve_version(&project.project, &normalized.version, import_date)
            .await?;
        saga.record_versions_replaced(&version.replaced);
        saga.record_project_version_created(&version.project_version.id);
        let project_version_id = version.project_version.id.as_str();

        // Phase 3: CreateComponents
        self.enter(ImportPhase::CreateComponents, cancellation, progress)?;
        let builder = DependencyGraphBuilder::new(&self.store, project_version_id, cancellation)
            .with_chunk_sizes(
                self.options.component_chunk_size,
                self.options.dependency_chunk_size,
            );
        let created = builder.create_nodes(&normalized.components, progress).await?;
        saga.record_components(created.len());

        // Phase 4: LinkDependencies
        self.enter(ImportPhase::LinkDependencies, cancellation, progress)?;
        let links = builder
            .link_dependencies(&normalized.dependencies, &created, progress)
            .await?;
        saga.record_relationships(links.relationships_created);
        if links.dangling_references > 0 {
            warnings.push(format!(
                "{} dependency reference(s) matched no component and were skipped",
                links.dangling_references
            ));
        }

        // Phases 5 and 6: FetchVulnerabilities, PersistVulnerabilities
        let purls: Vec<String> = created.iter().map(|c| c.purl.clone()).collect();
        let enrichment = self
            .enrich(&purls, project_version_id, request.skip_vulnerabilities, cancellation, progress)
            .await?;

        // Every write is done; cancellation is not checked past this point
        self.report_phase(ImportPhase::Complete, progress);

        let mut report = ImportReport {
            project: project.project,
            project_created: project.created,
            replaced_versions: version.replaced,
            project_version: version.project_version,
            components_created: created.len(),
            dependency_links: links.links,
            relationships_created: links.relationships_created,
            dangling_references: links.dangling_references,
            enrichment,
            warnings,
        };
        let failures = report.enrichment_failures();
        if failures > 0 {
            report.warnings.push(format!(
                "vulnerability enrichment failed for {} component(s)",
                failures
            ));
        }
        Ok(report)
    }

    async fn enrich(
        &self,
        purls: &[String],
        project_version_id: &str,
        skip: bool,
        cancellation: &CancellationToken,
        progress: &ProgressTracker<'_>,
    ) -> std::result::Result<Vec<EnrichmentOutcome>, ImportError> {
        self.enter(ImportPhase::FetchVulnerabilities, cancellation, progress)?;
        if skip {
            tracing::info!("vulnerability lookup skipped");
            self.enter(ImportPhase::PersistVulnerabilities, cancellation, progress)?;
            return Ok(purls
                .iter()
                .map(|purl| EnrichmentOutcome::new(purl.clone(), EnrichmentStatus::Skipped))
                .collect());
        }

        let enricher =
            VulnerabilityEnricher::new(&self.store, &self.feed, project_version_id, cancellation)
                .with_chunk_size(self.options.vulnerability_chunk_size)
                .with_concurrency(self.options.persist_concurrency);
        let lookups = enricher.fetch(purls, progress).await?;

        self.enter(ImportPhase::PersistVulnerabilities, cancellation, progress)?;
        enricher.persist(lookups, progress).await
    }

    /// Checks for cancellation, then reports the start of `phase`.
    ///
    /// Only phases that may still write go through here; `Complete` is
    /// reported with `report_phase` alone.
    fn enter(
        &self,
        phase: ImportPhase,
        cancellation: &CancellationToken,
        progress: &dyn ProgressReporter,
    ) -> std::result::Result<ImportPhase, ImportError> {
        if cancellation.is_cancelled() {
            tracing::info!(%phase, "import cancelled");
            return Err(ImportError::Cancelled { phase });
        }
        self.report_phase(phase, progress);
        Ok(phase)
    }

    fn report_phase(&self, phase: ImportPhase, progress: &dyn ProgressReporter) {
        tracing::info!(%phase, "{}", phase.status_label());
        progress.report_progress(phase.progress_range().0, phase.status_label());
    }
}

#[async_trait]
impl<S, F, PR> SbomImportPort for ImportSbomUseCase<S, F, PR>
where
    S: GraphStore,
    F: VulnerabilityFeed,
    PR: ProgressReporter,
{
    async fn import_sbom(&self, request: ImportRequest) -> Result<ImportReport> {
        self.execute(request).await
    }
}
