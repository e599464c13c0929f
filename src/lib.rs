//! depvis-import - SBOM import pipeline for dependency graph stores
//!
//! This library imports a CycloneDX-style SBOM into a graph of projects,
//! project versions, components and dependency edges, and enriches every
//! component with known vulnerabilities. It follows hexagonal architecture
//! and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`bom_import`): Entities, SBOM normalization and version ordering
//! - **Application Layer** (`application`): The import use case and its pipeline stages
//! - **Ports** (`ports`): Interface definitions for the store, the feed and progress
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use depvis_import::prelude::*;
//! use std::path::Path;
//!
//! # async fn example() -> Result<()> {
//! // Create adapters
//! let document = FileSystemReader::new().read_sbom(Path::new("bom.json"))?;
//! let store = InMemoryGraphStore::new();
//! let feed = CachingVulnerabilityFeed::new(OsvClient::new()?);
//! let progress_reporter = StderrProgressReporter::new();
//!
//! // Create use case
//! let use_case = ImportSbomUseCase::new(store, feed, progress_reporter);
//!
//! // Execute
//! let request = ImportRequest::builder()
//!     .document(document)
//!     .project_name("my-service")
//!     .build()?;
//! let report = use_case.execute(request).await?;
//! println!("{} components imported", report.components_created);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod bom_import;
pub mod config;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::FileSystemReader;
    pub use crate::adapters::outbound::memory::InMemoryGraphStore;
    pub use crate::adapters::outbound::network::{CachingVulnerabilityFeed, OsvClient};
    pub use crate::application::dto::{
        EnrichmentOutcome, EnrichmentStatus, ImportOptions, ImportReport, ImportRequest,
    };
    pub use crate::application::use_cases::ImportSbomUseCase;
    pub use crate::bom_import::domain::{
        Component, ImportPhase, Project, ProjectHint, ProjectVersion, Vulnerability,
    };
    pub use crate::bom_import::services::{BomNormalizer, VersionComparator};
    pub use crate::ports::inbound::SbomImportPort;
    pub use crate::ports::outbound::{
        GraphStore, ProgressReporter, SbomReader, VulnerabilityFeed,
    };
    pub use crate::shared::error::ImportError;
    pub use crate::shared::Result;
}
