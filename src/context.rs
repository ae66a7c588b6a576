use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    config::ManifestSource,
    error::{LoadError, Result},
    manifest::read_manifest,
};

pub const MANIFEST_FILE: &str = "package.json";
pub const MANIFEST_ENV: &str = "PLUGLOAD_MANIFEST";

/// The process surroundings manifest discovery depends on.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    cwd: PathBuf,
    vars: BTreeMap<String, String>,
}

/// A parsed manifest and the directory plugins are resolved from.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub value: Value,
    pub base_dir: PathBuf,
    pub path: Option<PathBuf>,
}

impl ProjectContext {
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| LoadError::Other(e.into()))?;
        Ok(Self {
            cwd,
            vars: std::env::vars().collect(),
        })
    }

    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Manifest path precedence:
    /// 1) explicit path (must exist)
    /// 2) PLUGLOAD_MANIFEST (must exist)
    /// 3) nearest package.json walking up from the working directory
    pub fn locate_manifest(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = explicit {
            let p = self.absolute(p);
            if !p.is_file() {
                debug!("manifest path does not exist: {}", p.display());
                return Err(LoadError::ConfigNotFound);
            }
            return Ok(p);
        }

        if let Some(p) = self.env_path(MANIFEST_ENV) {
            if !p.is_file() {
                debug!("{MANIFEST_ENV} is set but file does not exist: {}", p.display());
                return Err(LoadError::ConfigNotFound);
            }
            return Ok(p);
        }

        self.cwd
            .ancestors()
            .map(|dir| dir.join(MANIFEST_FILE))
            .find(|p| p.is_file())
            .ok_or(LoadError::ConfigNotFound)
    }

    pub fn load(&self, source: &ManifestSource) -> Result<LoadedManifest> {
        let path = match source {
            ManifestSource::Missing => return Err(LoadError::ConfigNotFound),
            ManifestSource::Value(Value::Null) => return Err(LoadError::ConfigNotFound),
            ManifestSource::Value(v) => {
                return Ok(LoadedManifest {
                    value: v.clone(),
                    base_dir: self.cwd.clone(),
                    path: None,
                })
            }
            ManifestSource::Path(p) => self.locate_manifest(Some(p))?,
            ManifestSource::Discover => self.locate_manifest(None)?,
        };

        debug!("reading manifest {}", path.display());
        let value = read_manifest(&path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());

        Ok(LoadedManifest {
            value,
            base_dir,
            path: Some(path),
        })
    }

    fn absolute(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.cwd.join(p)
        }
    }

    fn env_path(&self, key: &str) -> Option<PathBuf> {
        self.vars
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| self.absolute(Path::new(s)))
    }
}
