use crate::bom_import::domain::ProjectHint;
use crate::shared::error::ImportError;
use crate::shared::Result;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// ImportRequest - Request DTO for the SBOM import use case
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Raw SBOM document
    pub document: Value,
    /// Target project; defaults to the SBOM's main component name when empty
    pub project: ProjectHint,
    /// Explicit version string, preferred over the SBOM's own
    pub project_version: Option<String>,
    /// Skip the vulnerability fetch and persist phases
    pub skip_vulnerabilities: bool,
    /// Checked at every phase boundary and before every chunk
    pub cancellation: CancellationToken,
}

impl ImportRequest {
    pub fn new(document: Value, project: ProjectHint) -> Self {
        Self {
            document,
            project,
            project_version: None,
            skip_vulnerabilities: false,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn builder() -> ImportRequestBuilder {
        ImportRequestBuilder::default()
    }
}

/// Builder for [`ImportRequest`]
#[derive(Debug, Default)]
pub struct ImportRequestBuilder {
    document: Option<Value>,
    project: ProjectHint,
    project_version: Option<String>,
    skip_vulnerabilities: bool,
    cancellation: Option<CancellationToken>,
}

impl ImportRequestBuilder {
    pub fn document(mut self, document: Value) -> Self {
        self.document = Some(document);
        self
    }

    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.project.id = Some(id.into());
        self
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project.name = Some(name.into());
        self
    }

    pub fn project_version(mut self, version: impl Into<String>) -> Self {
        self.project_version = Some(version.into());
        self
    }

    pub fn skip_vulnerabilities(mut self, skip: bool) -> Self {
        self.skip_vulnerabilities = skip;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn build(self) -> Result<ImportRequest> {
        let document = self.document.ok_or_else(|| ImportError::Validation {
            message: "an SBOM document is required".to_string(),
        })?;

        Ok(ImportRequest {
            document,
            project: self.project,
            project_version: self.project_version,
            skip_vulnerabilities: self.skip_vulnerabilities,
            cancellation: self.cancellation.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_requires_document() {
        let result = ImportRequest::builder().project_name("app").build();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("SBOM document is required"));
    }

    #[test]
    fn test_builder_sets_fields() {
        let token = CancellationToken::new();
        let request = ImportRequest::builder()
            .document(json!({}))
            .project_name("app")
            .project_version("1.2.3")
            .skip_vulnerabilities(true)
            .cancellation(token.clone())
            .build()
            .unwrap();

        assert_eq!(request.project, ProjectHint::by_name("app"));
        assert_eq!(request.project_version.as_deref(), Some("1.2.3"));
        assert!(request.skip_vulnerabilities);

        token.cancel();
        assert!(request.cancellation.is_cancelled());
    }

    #[test]
    fn test_new_defaults() {
        let request = ImportRequest::new(json!({}), ProjectHint::by_id("p-1"));
        assert!(request.project_version.is_none());
        assert!(!request.skip_vulnerabilities);
        assert!(!request.cancellation.is_cancelled());
    }
}
