use crate::bom_import::domain::ImportPhase;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow job runners and CI systems to distinguish between
/// argument problems and failed imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Import finished
    Success = 0,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (store failure, unreadable SBOM, cancelled import, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Errors raised by the SBOM import pipeline.
///
/// Ports and adapters report failures as `anyhow::Error`; the import
/// use case converts them into one of these variants at the phase boundary
/// so callers can `downcast_ref::<ImportError>()` and see which phase failed.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("SBOM has no main component (metadata.component is missing)\n\n💡 Hint: The document metadata must describe the project's own package")]
    MissingMainComponent,

    #[error("Invalid information - missing project or project version\n\n💡 Hint: Pass a project name/id and make sure the SBOM declares a version")]
    MissingProjectOrVersion,

    #[error("Invalid SBOM document: {details}")]
    InvalidDocument { details: String },

    #[error("Store write failed during {phase}\nDetails: {details}")]
    StoreWrite { phase: ImportPhase, details: String },

    #[error("Vulnerability lookup failed for {purl}\nDetails: {details}")]
    ExternalFeed { purl: String, details: String },

    #[error("Import cancelled before {phase}")]
    Cancelled { phase: ImportPhase },

    #[error("SBOM file not found: {path}\n\n💡 Hint: Check the path passed on the command line")]
    SbomNotFound { path: PathBuf },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    /// Validation error for builders and configuration
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl ImportError {
    /// Wraps a store failure for the given phase
    pub fn store_write(phase: ImportPhase, err: impl fmt::Display) -> Self {
        ImportError::StoreWrite {
            phase,
            details: err.to_string(),
        }
    }

    /// The phase this error belongs to, when it is attributable to one
    pub fn phase(&self) -> Option<ImportPhase> {
        match self {
            ImportError::MissingMainComponent | ImportError::InvalidDocument { .. } => {
                Some(ImportPhase::Normalize)
            }
            ImportError::MissingProjectOrVersion => Some(ImportPhase::ResolveProjectVersion),
            ImportError::StoreWrite { phase, .. } | ImportError::Cancelled { phase } => {
                Some(*phase)
            }
            ImportError::ExternalFeed { .. } => Some(ImportPhase::FetchVulnerabilities),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::InvalidArguments.as_i32(), 2);
        assert_eq!(ExitCode::ApplicationError.as_i32(), 3);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::ApplicationError),
            "Application Error (3)"
        );
    }

    #[test]
    fn test_missing_main_component_display() {
        let display = format!("{}", ImportError::MissingMainComponent);
        assert!(display.contains("no main component"));
        assert!(display.contains("💡 Hint:"));
    }

    #[test]
    fn test_store_write_display_names_phase() {
        let error = ImportError::store_write(ImportPhase::CreateComponents, "connection reset");
        let display = format!("{}", error);
        assert!(display.contains("CreateComponents"));
        assert!(display.contains("connection reset"));
        assert_eq!(error.phase(), Some(ImportPhase::CreateComponents));
    }

    #[test]
    fn test_cancelled_display() {
        let error = ImportError::Cancelled {
            phase: ImportPhase::LinkDependencies,
        };
        assert_eq!(
            format!("{}", error),
            "Import cancelled before LinkDependencies"
        );
    }

    #[test]
    fn test_phase_of_resolution_errors() {
        assert_eq!(
            ImportError::MissingMainComponent.phase(),
            Some(ImportPhase::Normalize)
        );
        assert_eq!(
            ImportError::MissingProjectOrVersion.phase(),
            Some(ImportPhase::ResolveProjectVersion)
        );
        assert_eq!(
            ImportError::Validation {
                message: "x".to_string()
            }
            .phase(),
            None
        );
    }

    #[test]
    fn test_file_read_error_display() {
        let error = ImportError::FileReadError {
            path: PathBuf::from("/test/bom.json"),
            details: "File not found".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to read file"));
        assert!(display.contains("/test/bom.json"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = ImportError::MissingProjectOrVersion.into();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::MissingProjectOrVersion)
        ));
    }
}
