use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum size of an SBOM document accepted for import (100 MB)
pub const MAX_SBOM_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum size of a graph store snapshot (512 MB)
pub const MAX_SNAPSHOT_SIZE: u64 = 512 * 1024 * 1024;

/// Validates a file before it is read into memory
///
/// # Security
/// Uses `symlink_metadata()` so the link itself is inspected, not its target.
///
/// # Errors
/// Returns an error if the path:
/// - cannot be inspected
/// - is a symbolic link
/// - is not a regular file
/// - is larger than `max_size` bytes
pub fn validate_input_file(path: &Path, description: &str, max_size: u64) -> Result<()> {
    let metadata = fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {} metadata: {}", description, e))?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    if metadata.len() > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            metadata.len(),
            max_size
        );
    }

    Ok(())
}

/// Validates a destination before it is overwritten
///
/// A missing file is fine; an existing one must not be a symbolic link,
/// and the parent directory must exist.
pub fn validate_output_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if parent != Path::new("") && !parent.is_dir() {
            anyhow::bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_symlink() => anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, writing to symbolic links is not allowed.",
            path.display()
        ),
        Ok(metadata) if metadata.is_dir() => {
            anyhow::bail!("{} is a directory", path.display())
        }
        _ => Ok(()),
    }
}
