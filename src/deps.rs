use std::collections::BTreeMap;

use crate::{
    error::{LoadError, Result},
    naming::PackageName,
};

/// One matched dependency on its way into the output object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepEntry {
    pub original_name: String, // e.g. "@myco/gulp-test-plugin"
    pub key: String,           // e.g. "testPlugin"
    pub namespace: Option<String>, // nesting scope, only when scopes are kept
}

impl DepEntry {
    /// Dotted path the entry is reachable under, e.g. "myco.testPlugin".
    pub fn path(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.key),
            None => self.key.clone(),
        }
    }
}

/// Tracks which dependency claimed which key, per namespace.
///
/// The top level is one namespace and every kept npm scope is another. A
/// scope name also occupies its top-level slot, so `@myco/...` nested under
/// `myco` conflicts with a plain dependency renamed to `myco`.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    top: BTreeMap<String, String>,
    scoped: BTreeMap<String, BTreeMap<String, String>>,
    scope_owner: BTreeMap<String, String>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, entry: &DepEntry) -> Result<()> {
        match &entry.namespace {
            None => {
                if let Some(owner) = self.scope_owner.get(&entry.key) {
                    return Err(collision(&entry.key, owner, &entry.original_name));
                }
                if let Some(prev) = self.top.get(&entry.key) {
                    return Err(collision(&entry.key, prev, &entry.original_name));
                }
                self.top
                    .insert(entry.key.clone(), entry.original_name.clone());
            }
            Some(ns) => {
                if let Some(prev) = self.top.get(ns) {
                    return Err(collision(ns, prev, &entry.original_name));
                }
                let names = self.scoped.entry(ns.clone()).or_default();
                if let Some(prev) = names.get(&entry.key) {
                    return Err(collision(&entry.path(), prev, &entry.original_name));
                }
                names.insert(entry.key.clone(), entry.original_name.clone());
                self.scope_owner
                    .entry(ns.clone())
                    .or_insert_with(|| entry.original_name.clone());
            }
        }
        Ok(())
    }
}

/// Fails on the first pair of entries sharing a key.
pub fn check_unique(entries: &[DepEntry]) -> Result<()> {
    let mut registry = KeyRegistry::new();
    for e in entries {
        registry.claim(e)?;
    }
    Ok(())
}

fn collision(key: &str, first: &str, second: &str) -> LoadError {
    LoadError::Collision {
        key: key.to_string(),
        first: first.to_string(),
        second: second.to_string(),
        cross_scope: PackageName::parse(first).scope != PackageName::parse(second).scope,
    }
}
