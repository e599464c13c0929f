use crate::bom_import::domain::{Component, DependencyDecl, ProjectHint};
use crate::shared::error::ImportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;

/// Version string used when neither the caller nor the SBOM supplies one
pub const NOT_KNOWN_PLACEHOLDER: &str = "n/a";

/// Canonical form of an SBOM, ready to be written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBom {
    pub project: ProjectHint,
    pub version: String,
    /// Purl of the project's own package (always part of `components`)
    pub main_component_purl: String,
    pub components: Vec<Component>,
    pub dependencies: Vec<DependencyDecl>,
    /// `metadata.timestamp` when it parsed as RFC 3339
    pub timestamp: Option<DateTime<Utc>>,
}

impl NormalizedBom {
    pub fn purls(&self) -> Vec<String> {
        self.components.iter().map(|c| c.purl.clone()).collect()
    }
}

/// Coerces a loosely-typed SBOM document into canonical entities.
///
/// Collections may be a single object or a sequence (documents converted
/// from CycloneDX XML collapse one-element lists); both become a `Vec`
/// here so nothing downstream branches on shape.
///
/// Every entry of a section is converted on its own. An entry that does not
/// have the expected shape fails the whole document with `InvalidDocument`
/// naming the section and the entry index; no entry is dropped silently.
pub struct BomNormalizer;

impl BomNormalizer {
    pub fn normalize(
        document: &Value,
        project: ProjectHint,
        explicit_version: Option<&str>,
    ) -> Result<NormalizedBom, ImportError> {
        if !document.is_object() {
            return Err(invalid("document root must be an object"));
        }

        let raw = RawBom::deserialize(document).map_err(|e| invalid(e.to_string()))?;

        let metadata = match raw.metadata {
            None | Some(Value::Null) => RawMetadata::default(),
            Some(value @ Value::Object(_)) => RawMetadata::deserialize(value)
                .map_err(|e| invalid(format!("metadata: {}", e)))?,
            Some(_) => return Err(invalid("metadata must be an object")),
        };
        let main = match metadata.component {
            None | Some(Value::Null) => return Err(ImportError::MissingMainComponent),
            Some(value) => parse_component(value, "metadata.component")?,
        };

        let version = explicit_version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .or_else(|| main.version.clone())
            .unwrap_or_else(|| NOT_KNOWN_PLACEHOLDER.to_string());

        let project = if project.is_empty() {
            ProjectHint::by_name(main.name.clone())
        } else {
            project
        };

        let components = Self::collect_components(raw.components, main.clone())?;
        let dependencies = Self::collect_dependencies(raw.dependencies)?;
        let timestamp = metadata
            .timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Ok(NormalizedBom {
            project,
            version,
            main_component_purl: main.purl,
            components,
            dependencies,
            timestamp,
        })
    }

    /// Declared components in document order, then the main component
    /// unless the document already lists it. Repeated purls keep the first.
    fn collect_components(
        section: Option<Value>,
        main_component: Component,
    ) -> Result<Vec<Component>, ImportError> {
        let mut seen = HashSet::new();
        let mut components = Vec::new();

        for (index, entry) in section_entries(section, "components", "component")?
            .into_iter()
            .enumerate()
        {
            let component = parse_component(entry, &format!("components entry {}", index))?;
            if seen.insert(component.purl.clone()) {
                components.push(component);
            } else {
                tracing::debug!(purl = %component.purl, "Skipping repeated component");
            }
        }

        if seen.insert(main_component.purl.clone()) {
            components.push(main_component);
        }

        Ok(components)
    }

    /// Entries without a non-empty depends-on list are dropped
    fn collect_dependencies(section: Option<Value>) -> Result<Vec<DependencyDecl>, ImportError> {
        let mut dependencies = Vec::new();

        for (index, entry) in section_entries(section, "dependencies", "dependency")?
            .into_iter()
            .enumerate()
        {
            let context = format!("dependencies entry {}", index);
            let raw = RawDependency::deserialize(object(entry, &context)?)
                .map_err(|e| invalid(format!("{}: {}", context, e)))?;

            let mut depends_on = Vec::new();
            for (i, target) in one_or_many(raw.dependency).into_iter().enumerate() {
                let target_context = format!("{}: dependency {}", context, i);
                let target = RawRef::deserialize(object(target, &target_context)?)
                    .map_err(|e| invalid(format!("{}: {}", target_context, e)))?;
                match target.reference {
                    Some(purl) if !purl.is_empty() => depends_on.push(purl),
                    _ => return Err(invalid(format!("{} has no ref", target_context))),
                }
            }
            match raw.depends_on {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => {
                    for (i, item) in items.into_iter().enumerate() {
                        match item {
                            Value::String(purl) if !purl.is_empty() => depends_on.push(purl),
                            _ => {
                                return Err(invalid(format!(
                                    "{}: dependsOn item {} is not a package reference",
                                    context, i
                                )))
                            }
                        }
                    }
                }
                Some(_) => return Err(invalid(format!("{}: dependsOn must be a list", context))),
            }

            if depends_on.is_empty() {
                continue;
            }
            match raw.reference {
                Some(purl) if !purl.is_empty() => {
                    dependencies.push(DependencyDecl::new(purl, depends_on))
                }
                _ => return Err(invalid(format!("{} has targets but no ref", context))),
            }
        }

        Ok(dependencies)
    }
}

fn invalid(details: impl Into<String>) -> ImportError {
    ImportError::InvalidDocument {
        details: details.into(),
    }
}

fn object(value: Value, context: &str) -> Result<Value, ImportError> {
    match value {
        Value::Object(_) => Ok(value),
        _ => Err(invalid(format!("{} is not an object", context))),
    }
}

fn parse_component(value: Value, context: &str) -> Result<Component, ImportError> {
    RawComponent::deserialize(object(value, context)?)
        .map_err(|e| invalid(format!("{}: {}", context, e)))?
        .into_component()
        .map_err(|e| match e {
            ImportError::InvalidDocument { details } => {
                invalid(format!("{}: {}", context, details))
            }
            other => other,
        })
}

fn one_or_many(value: Option<Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(item) => vec![item],
    }
}

/// Entries of `components: [..]` / `components: {component: ..}` style sections.
///
/// `null`, `""` and `{}` are empty sections; any other shape is invalid.
fn section_entries(
    section: Option<Value>,
    name: &str,
    wrapper: &str,
) -> Result<Vec<Value>, ImportError> {
    match section {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.is_empty() => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Object(mut map)) => match map.remove(wrapper) {
            Some(inner) => Ok(one_or_many(Some(inner))),
            None if map.is_empty() => Ok(Vec::new()),
            None => Err(invalid(format!(
                "{} must be a list or an object holding '{}'",
                name, wrapper
            ))),
        },
        Some(_) => Err(invalid(format!("{} must be a list or an object", name))),
    }
}

// Raw document shape

#[derive(Debug, Deserialize)]
struct RawBom {
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    components: Option<Value>,
    #[serde(default)]
    dependencies: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    component: Option<Value>,
    #[serde(default, deserialize_with = "loose_string")]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(rename = "type", default, deserialize_with = "loose_string")]
    component_type: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    version: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    purl: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    author: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    publisher: Option<String>,
}

impl RawComponent {
    fn into_component(self) -> Result<Component, ImportError> {
        let purl = match (self.purl.filter(|p| !p.is_empty()), &self.name) {
            (Some(purl), _) => purl,
            (None, Some(name)) => Component::fallback_purl(name, self.version.as_deref()),
            (None, None) => return Err(invalid("component has neither purl nor name")),
        };

        Ok(Component {
            component_type: self.component_type,
            name: self.name.unwrap_or_else(|| purl.clone()),
            version: self.version,
            purl,
            author: self.author,
            publisher: self.publisher,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawDependency {
    #[serde(rename = "ref", default, deserialize_with = "loose_string")]
    reference: Option<String>,
    #[serde(default)]
    dependency: Option<Value>,
    #[serde(rename = "dependsOn", default)]
    depends_on: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "ref", default, deserialize_with = "loose_string")]
    reference: Option<String>,
}

/// Accepts strings, numbers and booleans as text; anything else is absent
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario_document() -> Value {
        json!({
            "metadata": {
                "component": {"name": "app", "version": "1.0", "purl": "pkg:npm/app@1.0"}
            },
            "components": {
                "component": [{"name": "lib", "version": "2.0", "purl": "pkg:npm/lib@2.0"}]
            },
            "dependencies": {
                "dependency": [{"ref": "pkg:npm/app@1.0", "dependency": {"ref": "pkg:npm/lib@2.0"}}]
            }
        })
    }

    #[test]
    fn test_normalize_scenario_document() {
        let bom = BomNormalizer::normalize(&scenario_document(), ProjectHint::by_name("app"), None)
            .unwrap();

        assert_eq!(bom.version, "1.0");
        assert_eq!(bom.main_component_purl, "pkg:npm/app@1.0");
        assert_eq!(bom.purls(), vec!["pkg:npm/lib@2.0", "pkg:npm/app@1.0"]);
        assert_eq!(
            bom.dependencies,
            vec![DependencyDecl::new(
                "pkg:npm/app@1.0",
                vec!["pkg:npm/lib@2.0".to_string()]
            )]
        );
    }

    #[test]
    fn test_single_component_object_becomes_list() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0"}},
            "components": {"component": {"name": "lib", "version": "2.0", "purl": "pkg:npm/lib@2.0"}}
        });
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert_eq!(bom.components.len(), 2);
        assert_eq!(bom.components[0].purl, "pkg:npm/lib@2.0");
    }

    #[test]
    fn test_plain_component_array_is_accepted() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0", "purl": "pkg:npm/app@1.0"}},
            "components": [{"name": "lib", "purl": "pkg:npm/lib@2.0"}],
            "dependencies": [{"ref": "pkg:npm/app@1.0", "dependsOn": ["pkg:npm/lib@2.0"]}]
        });
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert_eq!(bom.components.len(), 2);
        assert_eq!(bom.dependencies[0].depends_on, vec!["pkg:npm/lib@2.0"]);
    }

    #[test]
    fn test_missing_main_component() {
        let doc = json!({"metadata": {}, "components": {"component": []}});
        let err = BomNormalizer::normalize(&doc, ProjectHint::by_name("app"), None).unwrap_err();
        assert!(matches!(err, ImportError::MissingMainComponent));

        let doc = json!({"components": []});
        let err = BomNormalizer::normalize(&doc, ProjectHint::by_name("app"), None).unwrap_err();
        assert!(matches!(err, ImportError::MissingMainComponent));
    }

    #[test]
    fn test_main_component_purl_falls_back_to_name_at_version() {
        let doc = json!({"metadata": {"component": {"name": "app", "version": "3.1"}}});
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert_eq!(bom.main_component_purl, "app@3.1");
        assert_eq!(bom.components.len(), 1);
        assert_eq!(bom.components[0].purl, "app@3.1");
    }

    #[test]
    fn test_main_component_not_duplicated_when_declared() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0", "purl": "pkg:npm/app@1.0"}},
            "components": {"component": [
                {"name": "app", "version": "1.0", "purl": "pkg:npm/app@1.0"},
                {"name": "lib", "version": "2.0", "purl": "pkg:npm/lib@2.0"}
            ]}
        });
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert_eq!(bom.purls(), vec!["pkg:npm/app@1.0", "pkg:npm/lib@2.0"]);
    }

    #[test]
    fn test_version_priority() {
        let doc = scenario_document();

        let explicit = BomNormalizer::normalize(&doc, ProjectHint::default(), Some("9.9.9")).unwrap();
        assert_eq!(explicit.version, "9.9.9");

        let blank = BomNormalizer::normalize(&doc, ProjectHint::default(), Some("  ")).unwrap();
        assert_eq!(blank.version, "1.0");

        let no_version = json!({"metadata": {"component": {"name": "app", "purl": "pkg:npm/app"}}});
        let placeholder = BomNormalizer::normalize(&no_version, ProjectHint::default(), None).unwrap();
        assert_eq!(placeholder.version, NOT_KNOWN_PLACEHOLDER);
    }

    #[test]
    fn test_numeric_version_is_coerced() {
        let doc = json!({"metadata": {"component": {"name": "app", "version": 2}}});
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert_eq!(bom.version, "2");
        assert_eq!(bom.main_component_purl, "app@2");
    }

    #[test]
    fn test_dependencies_without_depends_on_are_dropped() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0", "purl": "pkg:npm/app@1.0"}},
            "dependencies": {"dependency": [
                {"ref": "pkg:npm/lib@2.0"},
                {"ref": "pkg:npm/app@1.0", "dependency": [{"ref": "pkg:npm/lib@2.0"}, {"ref": "pkg:npm/util@1.0"}]}
            ]}
        });
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert_eq!(bom.dependencies.len(), 1);
        assert_eq!(
            bom.dependencies[0].depends_on,
            vec!["pkg:npm/lib@2.0", "pkg:npm/util@1.0"]
        );
    }

    #[test]
    fn test_empty_sections_are_tolerated() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0"}},
            "components": "",
            "dependencies": {}
        });
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert_eq!(bom.components.len(), 1);
        assert!(bom.dependencies.is_empty());
    }

    #[test]
    fn test_project_hint_defaults_to_main_component_name() {
        let bom =
            BomNormalizer::normalize(&scenario_document(), ProjectHint::default(), None).unwrap();
        assert_eq!(bom.project, ProjectHint::by_name("app"));

        let bom = BomNormalizer::normalize(&scenario_document(), ProjectHint::by_id("p-1"), None)
            .unwrap();
        assert_eq!(bom.project, ProjectHint::by_id("p-1"));
    }

    #[test]
    fn test_timestamp_parsed_when_rfc3339() {
        let doc = json!({
            "metadata": {
                "timestamp": "2023-04-01T12:00:00Z",
                "component": {"name": "app", "version": "1.0"}
            }
        });
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert_eq!(bom.timestamp.unwrap().to_rfc3339(), "2023-04-01T12:00:00+00:00");

        let doc = json!({
            "metadata": {"timestamp": "yesterday", "component": {"name": "app"}}
        });
        let bom = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap();
        assert!(bom.timestamp.is_none());
    }

    #[test]
    fn test_non_object_document_is_invalid() {
        let err = BomNormalizer::normalize(&json!([1, 2]), ProjectHint::default(), None).unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument { .. }));
    }

    #[test]
    fn test_component_without_identity_is_invalid() {
        let doc = json!({
            "metadata": {"component": {"name": "app"}},
            "components": [{"version": "1.0"}]
        });
        let err = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument { .. }));
    }

    #[test]
    fn test_malformed_depends_on_item_fails_document() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0", "purl": "pkg:npm/app@1.0"}},
            "components": [
                {"name": "lib", "version": "2.0", "purl": "pkg:npm/lib@2.0"},
                {"name": "util", "version": "1.0", "purl": "pkg:npm/util@1.0"}
            ],
            "dependencies": [
                {"ref": "pkg:npm/app@1.0", "dependency": [{"ref": "pkg:npm/lib@2.0"}]},
                {"ref": "pkg:npm/lib@2.0", "dependsOn": ["pkg:npm/util@1.0", 7]}
            ]
        });
        match BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap_err() {
            ImportError::InvalidDocument { details } => {
                assert!(details.contains("dependencies entry 1"), "{details}");
                assert!(details.contains("dependsOn item 1"), "{details}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_component_entry_fails_document() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0"}},
            "components": {"component": ["a", "b", "c", "d"]}
        });
        match BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap_err() {
            ImportError::InvalidDocument { details } => {
                assert_eq!(details, "components entry 0 is not an object");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_component_error_names_entry() {
        let doc = json!({
            "metadata": {"component": {"name": "app"}},
            "components": [{"name": "lib", "purl": "pkg:npm/lib@2.0"}, {"version": "1.0"}]
        });
        match BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap_err() {
            ImportError::InvalidDocument { details } => {
                assert!(details.starts_with("components entry 1:"), "{details}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nested_dependency_must_be_object_with_ref() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0", "purl": "pkg:npm/app@1.0"}},
            "dependencies": {"dependency": {"ref": "pkg:npm/app@1.0", "dependency": ["pkg:npm/lib@2.0"]}}
        });
        let err = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument { ref details }
            if details == "dependencies entry 0: dependency 0 is not an object"));
    }

    #[test]
    fn test_dependency_with_targets_but_no_ref_fails_document() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0", "purl": "pkg:npm/app@1.0"}},
            "dependencies": [{"dependsOn": ["pkg:npm/lib@2.0"]}]
        });
        let err = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument { .. }));
    }

    #[test]
    fn test_unexpected_section_shape_fails_document() {
        let doc = json!({
            "metadata": {"component": {"name": "app", "version": "1.0"}},
            "components": {"items": []}
        });
        let err = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument { .. }));

        let doc = json!({"metadata": {"component": ["app", "1.0"]}});
        let err = BomNormalizer::normalize(&doc, ProjectHint::default(), None).unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument { ref details }
            if details == "metadata.component is not an object"));
    }
}
