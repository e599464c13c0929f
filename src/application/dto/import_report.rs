use crate::bom_import::domain::{Project, ProjectVersion};

/// Result of enriching one component with vulnerability data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentStatus {
    /// The feed reported no vulnerabilities
    Clean,
    /// Vulnerabilities were linked; `created` counts nodes new to the store
    Linked { vulnerabilities: usize, created: usize },
    /// The feed lookup failed; nothing was written for this component
    FeedFailed(String),
    /// Lookup succeeded but writing to the store failed
    PersistFailed(String),
    /// Vulnerability phases were skipped for this import
    Skipped,
}

impl EnrichmentStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            EnrichmentStatus::FeedFailed(_) | EnrichmentStatus::PersistFailed(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentOutcome {
    pub purl: String,
    pub status: EnrichmentStatus,
}

impl EnrichmentOutcome {
    pub fn new(purl: impl Into<String>, status: EnrichmentStatus) -> Self {
        Self {
            purl: purl.into(),
            status,
        }
    }
}

/// ImportReport - Response DTO of a successful SBOM import
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub project: Project,
    pub project_version: ProjectVersion,
    /// True when the project did not exist before this import
    pub project_created: bool,
    /// Ids of earlier versions with the same version string that were replaced
    pub replaced_versions: Vec<String>,
    pub components_created: usize,
    /// Dependency entries sent to the store (entries without targets excluded)
    pub dependency_links: usize,
    pub relationships_created: usize,
    /// `dependsOn` purls that matched no component of this version
    pub dangling_references: usize,
    /// One entry per component, in component order
    pub enrichment: Vec<EnrichmentOutcome>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    /// Total component-to-vulnerability links written
    pub fn vulnerabilities_linked(&self) -> usize {
        self.enrichment
            .iter()
            .map(|outcome| match outcome.status {
                EnrichmentStatus::Linked { vulnerabilities, .. } => vulnerabilities,
                _ => 0,
            })
            .sum()
    }

    /// Vulnerability nodes that did not exist in the store before this import
    pub fn vulnerabilities_created(&self) -> usize {
        self.enrichment
            .iter()
            .map(|outcome| match outcome.status {
                EnrichmentStatus::Linked { created, .. } => created,
                _ => 0,
            })
            .sum()
    }

    pub fn enrichment_failures(&self) -> usize {
        self.enrichment
            .iter()
            .filter(|outcome| outcome.status.is_failure())
            .count()
    }
}
