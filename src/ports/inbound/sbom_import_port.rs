use crate::application::dto::{ImportReport, ImportRequest};
use crate::shared::Result;
use async_trait::async_trait;

/// SbomImportPort - Inbound port for the SBOM import use case
///
/// Job workers and the CLI drive imports through this port. One call is one
/// import job; retrying means calling it again with the same request.
#[async_trait]
pub trait SbomImportPort: Send + Sync {
    /// Imports an SBOM into the graph store
    ///
    /// # Errors
    /// Returns an error wrapping [`crate::shared::error::ImportError`] if:
    /// - The SBOM has no main component or is not an object
    /// - The project or version cannot be determined
    /// - A store write fails (already written chunks stay persisted)
    /// - The import is cancelled
    async fn import_sbom(&self, request: ImportRequest) -> Result<ImportReport>;
}
