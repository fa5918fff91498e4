//! Dependency manifest (package.json) loading.
//!
//! Only the `name` field and the `dependencies` mapping are consumed;
//! version constraints are parsed but otherwise ignored. A manifest that
//! fails to parse, or that lacks a package name, aborts the run before any
//! network activity.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{DepdomainsError, Result};

/// The subset of package.json this tool cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    name: String,

    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

impl Manifest {
    /// Load and parse a manifest from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(&path)
            .map_err(|e| DepdomainsError::manifest_parse(&path_str, e.to_string()))?;
        let manifest: Manifest = serde_json::from_str(&content)
            .map_err(|e| DepdomainsError::manifest_parse(&path_str, e.to_string()))?;
        if manifest.name.is_empty() {
            return Err(DepdomainsError::missing_package_name(&path_str));
        }
        Ok(manifest)
    }

    /// Parse a manifest from a JSON string (path used only for error context).
    pub fn from_json(content: &str, path: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(content)
            .map_err(|e| DepdomainsError::manifest_parse(path, e.to_string()))?;
        if manifest.name.is_empty() {
            return Err(DepdomainsError::missing_package_name(path));
        }
        Ok(manifest)
    }

    /// The declaring package's own name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the directly declared dependencies.
    pub fn direct_dependencies(&self) -> Vec<String> {
        self.dependencies.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_manifest(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn parses_name_and_dependencies() {
        let file = write_manifest(
            r#"{"name": "my-app", "version": "1.0.0",
                "dependencies": {"leftpad-lite": "^1.2.0", "chalkish": "~0.4"}}"#,
        );
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.name(), "my-app");
        assert_eq!(
            manifest.direct_dependencies(),
            vec!["chalkish".to_string(), "leftpad-lite".to_string()]
        );
    }

    #[test]
    fn version_constraints_ignored() {
        let manifest = Manifest::from_json(
            r#"{"name": "app", "dependencies": {"a": ">=2.0.0 <3", "b": "git+https://x/y.git"}}"#,
            "package.json",
        )
        .unwrap();
        assert_eq!(manifest.direct_dependencies().len(), 2);
    }

    #[test]
    fn missing_dependencies_is_empty() {
        let manifest = Manifest::from_json(r#"{"name": "app"}"#, "package.json").unwrap();
        assert!(manifest.direct_dependencies().is_empty());
    }

    #[test]
    fn malformed_json_is_fatal() {
        let err = Manifest::from_json("{not json", "broken.json").unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_name_is_fatal() {
        let err = Manifest::from_json(r#"{"dependencies": {}}"#, "package.json").unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            DepdomainsError::MissingPackageName { .. }
        ));
    }

    #[test]
    fn load_missing_file_is_fatal() {
        let err = Manifest::load("/nonexistent/package.json").unwrap_err();
        assert!(err.is_fatal());
    }
}
