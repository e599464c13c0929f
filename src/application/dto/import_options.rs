use crate::shared::error::ImportError;

/// Tuning knobs of one import
///
/// Chunk sizes bound the number of items per store round-trip; the
/// persist concurrency bounds how many components have their
/// vulnerabilities written at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub component_chunk_size: usize,
    pub dependency_chunk_size: usize,
    pub vulnerability_chunk_size: usize,
    pub persist_concurrency: usize,
    /// Delete the new project version again when a later phase fails
    pub compensate_on_failure: bool,
}

impl ImportOptions {
    pub const DEFAULT_COMPONENT_CHUNK_SIZE: usize = 5;
    pub const DEFAULT_DEPENDENCY_CHUNK_SIZE: usize = 100;
    pub const DEFAULT_VULNERABILITY_CHUNK_SIZE: usize = 10;
    pub const DEFAULT_PERSIST_CONCURRENCY: usize = 4;

    pub fn validate(&self) -> Result<(), ImportError> {
        let checks = [
            ("component_chunk_size", self.component_chunk_size),
            ("dependency_chunk_size", self.dependency_chunk_size),
            ("vulnerability_chunk_size", self.vulnerability_chunk_size),
            ("persist_concurrency", self.persist_concurrency),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ImportError::Validation {
                    message: format!("{} must be greater than 0", name),
                });
            }
        }
        Ok(())
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            component_chunk_size: Self::DEFAULT_COMPONENT_CHUNK_SIZE,
            dependency_chunk_size: Self::DEFAULT_DEPENDENCY_CHUNK_SIZE,
            vulnerability_chunk_size: Self::DEFAULT_VULNERABILITY_CHUNK_SIZE,
            persist_concurrency: Self::DEFAULT_PERSIST_CONCURRENCY,
            compensate_on_failure: false,
        }
    }
}
