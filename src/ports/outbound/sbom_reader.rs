use crate::shared::Result;
use serde_json::Value;
use std::path::Path;

/// SbomReader port for loading raw SBOM documents
///
/// The document is returned loosely typed; shaping it into entities is
/// the normalizer's job.
pub trait SbomReader {
    /// Reads and parses the SBOM at `path`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file does not exist or cannot be read
    /// - The content is not valid JSON
    fn read_sbom(&self, path: &Path) -> Result<Value>;
}
