use std::collections::BTreeMap;

use crate::{
    deps::{DepEntry, KeyRegistry},
    error::{LoadError, Result},
    lazy::Lazy,
};

/// A plugin slot plus the dependency it came from.
#[derive(Debug)]
pub struct Plugin<M> {
    pub name: String,
    slot: Lazy<M>,
}

impl<M> Plugin<M> {
    pub fn get(&self) -> Result<&M> {
        self.slot.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.is_loaded()
    }
}

pub type Scope<M> = BTreeMap<String, Plugin<M>>;

#[derive(Debug)]
pub enum Node<M> {
    Plugin(Plugin<M>),
    Scope(Scope<M>),
}

/// The assembled plugin object: top-level plugins and npm scope namespaces.
#[derive(Debug)]
pub struct Plugins<M> {
    root: BTreeMap<String, Node<M>>,
}

impl<M> Default for Plugins<M> {
    fn default() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }
}

impl<M> Plugins<M> {
    /// Builds the object from already-resolved entries. Keys are checked
    /// again here so a hand-built entry list cannot overwrite anything.
    pub fn assemble<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (DepEntry, Lazy<M>)>,
    {
        let mut registry = KeyRegistry::new();
        let mut out = Self::default();

        for (entry, slot) in entries {
            registry.claim(&entry)?;

            let plugin = Plugin {
                name: entry.original_name,
                slot,
            };

            match entry.namespace {
                None => {
                    out.root.insert(entry.key, Node::Plugin(plugin));
                }
                Some(ns) => {
                    let node = out
                        .root
                        .entry(ns)
                        .or_insert_with(|| Node::Scope(Scope::new()));
                    if let Node::Scope(scope) = node {
                        scope.insert(entry.key, plugin);
                    }
                }
            }
        }

        Ok(out)
    }

    /// Top-level plugin by key.
    pub fn get(&self, key: &str) -> Result<&M> {
        match self.root.get(key) {
            Some(Node::Plugin(p)) => p.get(),
            _ => Err(unknown(key)),
        }
    }

    /// Plugin nested under an npm scope.
    pub fn scoped(&self, scope: &str, key: &str) -> Result<&M> {
        match self.scope(scope).and_then(|s| s.get(key)) {
            Some(p) => p.get(),
            None => Err(unknown(&format!("{scope}.{key}"))),
        }
    }

    pub fn scope(&self, name: &str) -> Option<&Scope<M>> {
        match self.root.get(name) {
            Some(Node::Scope(s)) => Some(s),
            _ => None,
        }
    }

    /// Resolves "key" or "scope.key". An exact top-level key wins, so keys
    /// that themselves contain dots still work.
    pub fn lookup(&self, path: &str) -> Result<&M> {
        if let Some(Node::Plugin(p)) = self.root.get(path) {
            return p.get();
        }
        match path.split_once('.') {
            Some((scope, key)) => self.scoped(scope, key),
            None => Err(unknown(path)),
        }
    }

    pub fn plugin(&self, path: &str) -> Option<&Plugin<M>> {
        if let Some(Node::Plugin(p)) = self.root.get(path) {
            return Some(p);
        }
        let (scope, key) = path.split_once('.')?;
        self.scope(scope)?.get(key)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.plugin(path).is_some()
    }

    /// Dotted paths of every plugin, scopes expanded.
    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|(k, _)| k).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, &Plugin<M>)> + '_ {
        self.root.iter().flat_map(|(k, node)| {
            let items: Vec<(String, &Plugin<M>)> = match node {
                Node::Plugin(p) => vec![(k.clone(), p)],
                Node::Scope(s) => s.iter().map(|(n, p)| (format!("{k}.{n}"), p)).collect(),
            };
            items
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn unknown(key: &str) -> LoadError {
    LoadError::UnknownKey {
        key: key.to_string(),
    }
}
