use crate::ports::outbound::SbomReader;
use crate::shared::error::ImportError;
use crate::shared::security::{validate_input_file, MAX_SBOM_SIZE};
use crate::shared::Result;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// FileSystemReader adapter for reading SBOM documents from the file system
///
/// Files are checked before reading: symbolic links, non-regular files and
/// files above the size limit are rejected.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomReader for FileSystemReader {
    fn read_sbom(&self, path: &Path) -> Result<Value> {
        if !path.exists() {
            return Err(ImportError::SbomNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        validate_input_file(path, "SBOM file", MAX_SBOM_SIZE).map_err(|e| {
            ImportError::FileReadError {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
        })?;

        let content = fs::read_to_string(path).map_err(|e| ImportError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| {
            ImportError::InvalidDocument {
                details: format!("{} is not valid JSON: {}", path.display(), e),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_sbom_success() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bom.json");
        fs::write(&path, r#"{"metadata": {"component": {"name": "app"}}}"#).unwrap();

        let reader = FileSystemReader::new();
        let document = reader.read_sbom(&path).unwrap();

        assert_eq!(document["metadata"]["component"]["name"], "app");
    }

    #[test]
    fn test_read_sbom_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let reader = FileSystemReader::new();
        let err = reader.read_sbom(&temp_dir.path().join("missing.json")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::SbomNotFound { .. })
        ));
    }

    #[test]
    fn test_read_sbom_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bom.json");
        fs::write(&path, "<bom/>").unwrap();

        let reader = FileSystemReader::new();
        let err = reader.read_sbom(&path).unwrap_err();

        assert!(format!("{}", err).contains("is not valid JSON"));
    }

    #[test]
    fn test_read_sbom_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();

        let reader = FileSystemReader::new();
        let err = reader.read_sbom(temp_dir.path()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::FileReadError { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_sbom_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("bom.json");
        let link = temp_dir.path().join("link.json");
        fs::write(&target, "{}").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let reader = FileSystemReader::new();
        let err = reader.read_sbom(&link).unwrap_err();

        assert!(format!("{}", err).contains("symbolic link"));
    }
}
