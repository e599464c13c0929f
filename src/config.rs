//! Configuration file support for depvis-import.
//!
//! Provides YAML-based configuration through `depvis-import.config.yml`
//! files, including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::application::dto::ImportOptions;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "depvis-import.config.yml";

/// Store snapshot used when neither the CLI nor the config names one
pub const DEFAULT_STORE_PATH: &str = "depvis-store.json";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub component_chunk_size: Option<usize>,
    pub dependency_chunk_size: Option<usize>,
    pub vulnerability_chunk_size: Option<usize>,
    pub persist_concurrency: Option<usize>,
    pub compensate_on_failure: Option<bool>,
    pub osv_api_url: Option<String>,
    pub store_path: Option<PathBuf>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    /// Import options with unset fields taken from the defaults
    pub fn import_options(&self) -> ImportOptions {
        let defaults = ImportOptions::default();
        ImportOptions {
            component_chunk_size: self
                .component_chunk_size
                .unwrap_or(defaults.component_chunk_size),
            dependency_chunk_size: self
                .dependency_chunk_size
                .unwrap_or(defaults.dependency_chunk_size),
            vulnerability_chunk_size: self
                .vulnerability_chunk_size
                .unwrap_or(defaults.vulnerability_chunk_size),
            persist_concurrency: self
                .persist_concurrency
                .unwrap_or(defaults.persist_concurrency),
            compensate_on_failure: self
                .compensate_on_failure
                .unwrap_or(defaults.compensate_on_failure),
        }
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Err(e) = config.import_options().validate() {
        bail!(
            "Invalid config: {}\n\n💡 Hint: Chunk sizes and persist_concurrency must be positive integers.",
            e
        );
    }

    if let Some(url) = config.osv_api_url.as_deref() {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!(
                "Invalid config: osv_api_url must be an http(s) URL, got '{}'.",
                url
            );
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        tracing::warn!(field = %key, "unknown config field will be ignored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
component_chunk_size: 20
dependency_chunk_size: 50
vulnerability_chunk_size: 5
persist_concurrency: 2
compensate_on_failure: true
osv_api_url: http://localhost:8080
store_path: /var/lib/depvis/store.json
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        let options = config.import_options();
        assert_eq!(options.component_chunk_size, 20);
        assert_eq!(options.dependency_chunk_size, 50);
        assert_eq!(options.vulnerability_chunk_size, 5);
        assert_eq!(options.persist_concurrency, 2);
        assert!(options.compensate_on_failure);
        assert_eq!(config.osv_api_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(
            config.store_path.as_deref(),
            Some(Path::new("/var/lib/depvis/store.json"))
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "component_chunk_size: 8\n").unwrap();

        let options = load_config_from_path(&config_path).unwrap().import_options();
        assert_eq!(options.component_chunk_size, 8);
        assert_eq!(options.dependency_chunk_size, 100);
        assert_eq!(options.vulnerability_chunk_size, 10);
        assert!(!options.compensate_on_failure);
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "persist_concurrency: 1\n").unwrap();

        let config = discover_config(dir.path()).unwrap();
        assert_eq!(config.unwrap().persist_concurrency, Some(1));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("bad.yml");
        fs::write(&config_path, "invalid: yaml: [[[broken").unwrap();

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_zero_chunk_size_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "dependency_chunk_size: 0\n").unwrap();

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("dependency_chunk_size must be greater than 0"));
    }

    #[test]
    fn test_invalid_osv_url_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "osv_api_url: ftp://mirror\n").unwrap();

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("osv_api_url"));
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "component_chunk_size: 3\nformat: json\n").unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert!(config.unknown_fields.contains_key("format"));
        assert_eq!(config.component_chunk_size, Some(3));
    }
}
