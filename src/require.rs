use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::trace;

use crate::error::{LoadError, Result};

/// Produces the module value for a dependency name.
///
/// `base_dir` is the directory the manifest lives in; loaders that resolve
/// packages on disk start their search there.
pub trait Loader<M> {
    fn load(&self, name: &str, base_dir: &Path) -> Result<M>;
}

impl<M, F> Loader<M> for F
where
    F: Fn(&str) -> Result<M>,
{
    fn load(&self, name: &str, _base_dir: &Path) -> Result<M> {
        self(name)
    }
}

/// What the default loader knows about an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub version: Option<String>,
    pub dir: PathBuf,
    pub main: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    main: Option<String>,
}

/// Resolves packages the way node does: `<dir>/node_modules/<name>`, trying
/// each ancestor of the base directory in turn.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeModulesLoader;

impl NodeModulesLoader {
    pub fn find_package_dir(name: &str, base_dir: &Path) -> Option<PathBuf> {
        base_dir.ancestors().find_map(|dir| {
            let candidate = dir.join("node_modules").join(name);
            trace!(candidate = %candidate.display(), "probing package directory");
            candidate.join("package.json").is_file().then_some(candidate)
        })
    }
}

impl Loader<ModuleInfo> for NodeModulesLoader {
    fn load(&self, name: &str, base_dir: &Path) -> Result<ModuleInfo> {
        let Some(dir) = Self::find_package_dir(name, base_dir) else {
            return Err(LoadError::module_not_found(name));
        };

        let manifest = dir.join("package.json");
        let text = fs::read_to_string(&manifest)
            .with_context(|| format!("failed to read {}", manifest.display()))?;
        let pkg: PackageJson = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", manifest.display()))?;

        let main = dir.join(pkg.main.as_deref().unwrap_or("index.js"));

        Ok(ModuleInfo {
            name: pkg.name.unwrap_or_else(|| name.to_string()),
            version: pkg.version,
            dir,
            main,
        })
    }
}

type Factory<M> = Box<dyn Fn() -> M>;

/// In-process table of named module factories.
pub struct Registry<M> {
    factories: BTreeMap<String, Factory<M>>,
}

impl<M> Default for Registry<M> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<M> Registry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> M + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl<M> Loader<M> for Registry<M> {
    fn load(&self, name: &str, _base_dir: &Path) -> Result<M> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| LoadError::module_not_found(name))
    }
}
