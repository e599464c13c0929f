use serde::{Deserialize, Serialize};

/// A software component declared by an SBOM.
///
/// `purl` is the correlation key inside one project version; the same purl
/// may appear in many versions and projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub purl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl Component {
    /// Creates a library component with only the identity fields set
    pub fn new(name: impl Into<String>, version: Option<String>, purl: impl Into<String>) -> Self {
        Self {
            component_type: None,
            name: name.into(),
            version,
            purl: purl.into(),
            author: None,
            publisher: None,
        }
    }

    /// Identity key used when a document supplies no purl: `name@version`,
    /// or the bare name when the version is unknown as well
    pub fn fallback_purl(name: &str, version: Option<&str>) -> String {
        match version {
            Some(v) if !v.is_empty() => format!("{}@{}", name, v),
            _ => name.to_string(),
        }
    }
}

/// A component as returned by the store after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedComponent {
    pub id: String,
    pub purl: String,
}

/// `purl` depends on every purl in `depends_on`, within one project version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    pub purl: String,
    pub depends_on: Vec<String>,
}

impl DependencyDecl {
    pub fn new(purl: impl Into<String>, depends_on: Vec<String>) -> Self {
        Self {
            purl: purl.into(),
            depends_on,
        }
    }
}
