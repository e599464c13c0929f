use std::fmt;

/// Phases of an SBOM import, in execution order.
///
/// Each phase owns a slice of the 0-100 progress scale; progress inside a
/// phase is interpolated within that slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImportPhase {
    Normalize,
    ResolveProjectVersion,
    CreateComponents,
    LinkDependencies,
    FetchVulnerabilities,
    PersistVulnerabilities,
    Complete,
}

impl ImportPhase {
    /// Inclusive progress range (start, end) in percent
    pub fn progress_range(self) -> (u8, u8) {
        match self {
            ImportPhase::Normalize | ImportPhase::ResolveProjectVersion => (0, 0),
            ImportPhase::CreateComponents => (0, 60),
            ImportPhase::LinkDependencies => (60, 70),
            ImportPhase::FetchVulnerabilities => (70, 90),
            ImportPhase::PersistVulnerabilities => (90, 100),
            ImportPhase::Complete => (100, 100),
        }
    }

    /// Human-readable status used in progress messages
    pub fn status_label(self) -> &'static str {
        match self {
            ImportPhase::Normalize => "Reading SBOM",
            ImportPhase::ResolveProjectVersion => "Creating new project version",
            ImportPhase::CreateComponents => "Creating components",
            ImportPhase::LinkDependencies => "Linking dependencies",
            ImportPhase::FetchVulnerabilities => "Fetching vulnerabilities",
            ImportPhase::PersistVulnerabilities => "Creating vulnerabilities in DB",
            ImportPhase::Complete => "Import complete",
        }
    }

    /// Status line for step `done` of `total` of this phase
    pub fn step_message(self, done: usize, total: usize) -> String {
        format!("{} — {} of {}", self.status_label(), done, total)
    }

    /// Percent reached after `done` of `total` steps of this phase
    pub fn interpolate(self, done: usize, total: usize) -> u8 {
        let (start, end) = self.progress_range();
        if total == 0 {
            return end;
        }
        let span = (end - start) as usize;
        start + (span * done.min(total) / total) as u8
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportPhase::Normalize => "Normalize",
            ImportPhase::ResolveProjectVersion => "ResolveProjectVersion",
            ImportPhase::CreateComponents => "CreateComponents",
            ImportPhase::LinkDependencies => "LinkDependencies",
            ImportPhase::FetchVulnerabilities => "FetchVulnerabilities",
            ImportPhase::PersistVulnerabilities => "PersistVulnerabilities",
            ImportPhase::Complete => "Complete",
        };
        f.write_str(name)
    }
}
