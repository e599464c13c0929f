pub mod component;
pub mod import_phase;
pub mod project;
pub mod vulnerability;

pub use component::{Component, CreatedComponent, DependencyDecl};
pub use import_phase::ImportPhase;
pub use project::{Project, ProjectHint, ProjectVersion};
pub use vulnerability::{CvssScore, Vulnerability, VulnerabilityReference};
