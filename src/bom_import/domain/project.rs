use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project as known to the graph store, together with its versions.
///
/// Names are the human identity of a project but are not enforced unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub versions: Vec<ProjectVersion>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            versions: Vec::new(),
        }
    }

    /// All versions whose version string is exactly `version`
    pub fn versions_matching<'a>(
        &'a self,
        version: &'a str,
    ) -> impl Iterator<Item = &'a ProjectVersion> + 'a {
        self.versions.iter().filter(move |pv| pv.version == version)
    }
}

/// One imported version of a project. Owns its components and edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: String,
    pub version: String,
    pub import_date: DateTime<Utc>,
}

/// Caller-supplied identity of the project an SBOM belongs to.
///
/// An id wins over a name when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectHint {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl ProjectHint {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// True when neither an id nor a non-blank name is present
    pub fn is_empty(&self) -> bool {
        self.id.as_deref().map_or(true, |id| id.trim().is_empty())
            && self.name.as_deref().map_or(true, |n| n.trim().is_empty())
    }
}
