use serde_json::Value;
use std::{fs, path::Path};
use tracing::debug;

use crate::error::{LoadError, Result};

pub const DEFAULT_SCOPES: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// Declared dependency names with their version specifiers, in the order the
/// manifest lists them. A name declared in several categories keeps its first
/// position and version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    entries: Vec<(String, String)>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the given categories (`dependencies`, ...) from a parsed
    /// manifest. Missing or non-object categories are skipped.
    pub fn from_manifest<S: AsRef<str>>(manifest: &Value, scopes: &[S]) -> Self {
        let mut out = Self::new();

        for scope in scopes {
            let Some(section) = manifest.get(scope.as_ref()).and_then(Value::as_object) else {
                continue;
            };
            for (name, version) in section {
                let version = match version {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out.insert(name, version);
            }
        }

        debug!(
            "{} dependencies declared: {}",
            out.len(),
            out.names().collect::<Vec<_>>().join(" ")
        );
        out
    }

    pub fn insert(&mut self, name: &str, version: String) {
        if self.get(name).is_none() {
            self.entries.push((name.to_string(), version));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads a JSON manifest (`package.json`).
pub fn read_manifest(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::Manifest {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    serde_json::from_str(&text).map_err(|e| LoadError::Manifest {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
