use regex::Regex;
use std::{collections::BTreeMap, fmt, rc::Rc};
use tracing::debug;

use crate::{
    deps::DepEntry,
    error::{LoadError, Result},
};

pub const DEFAULT_REPLACE_PATTERN: &str = r"^gulp(-|\.)";

pub type RenameFn = Rc<dyn Fn(&str) -> String>;

/// What gets removed from the front of a dependency name before camelizing.
#[derive(Debug, Clone)]
pub enum ReplaceString {
    /// Removed only when the name starts with it.
    Literal(String),
    /// First match removed.
    Pattern(Regex),
}

impl ReplaceString {
    pub fn pattern(raw: &str) -> Result<Self> {
        let re = Regex::new(raw).map_err(|source| LoadError::InvalidReplacePattern {
            pattern: raw.to_string(),
            source,
        })?;
        Ok(Self::Pattern(re))
    }

    pub fn literal(raw: impl Into<String>) -> Self {
        Self::Literal(raw.into())
    }

    pub fn strip<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            Self::Literal(prefix) => name.strip_prefix(prefix.as_str()).unwrap_or(name).into(),
            Self::Pattern(re) => re.replace(name, ""),
        }
    }
}

impl Default for ReplaceString {
    fn default() -> Self {
        match Regex::new(DEFAULT_REPLACE_PATTERN) {
            Ok(re) => Self::Pattern(re),
            Err(_) => Self::Literal("gulp-".to_string()),
        }
    }
}

/// A package name split into its npm scope (without `@`) and the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageName<'a> {
    pub scope: Option<&'a str>,
    pub rest: &'a str,
}

impl<'a> PackageName<'a> {
    pub fn parse(name: &'a str) -> Self {
        if let Some((scope, rest)) = name.strip_prefix('@').and_then(|s| s.split_once('/')) {
            if !scope.is_empty() && !rest.is_empty() {
                return Self {
                    scope: Some(scope),
                    rest,
                };
            }
        }
        Self { scope: None, rest: name }
    }
}

/// `foo-bar-baz` -> `fooBarBaz`. The first segment is lowercased and empty
/// segments disappear.
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut segments = name.split('-');

    if let Some(first) = segments.next() {
        out.push_str(&first.to_lowercase());
    }

    for seg in segments {
        let mut chars = seg.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    out
}

/// Turns a matched dependency name into the key it is exposed under.
#[derive(Clone)]
pub struct NameTransformer {
    replace: ReplaceString,
    camelize: bool,
    maintain_scope: bool,
    rename: BTreeMap<String, String>,
    rename_fn: Option<RenameFn>,
}

impl fmt::Debug for NameTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTransformer")
            .field("replace", &self.replace)
            .field("camelize", &self.camelize)
            .field("maintain_scope", &self.maintain_scope)
            .field("rename", &self.rename)
            .field("rename_fn", &self.rename_fn.is_some())
            .finish()
    }
}

impl Default for NameTransformer {
    fn default() -> Self {
        Self {
            replace: ReplaceString::default(),
            camelize: true,
            maintain_scope: true,
            rename: BTreeMap::new(),
            rename_fn: None,
        }
    }
}

impl NameTransformer {
    pub fn new(replace: ReplaceString, camelize: bool, maintain_scope: bool) -> Self {
        Self {
            replace,
            camelize,
            maintain_scope,
            ..Self::default()
        }
    }

    pub fn with_rename(mut self, rename: BTreeMap<String, String>) -> Self {
        self.rename = rename;
        self
    }

    pub fn with_rename_fn(mut self, rename_fn: Option<RenameFn>) -> Self {
        self.rename_fn = rename_fn;
        self
    }

    pub fn maintain_scope(&self) -> bool {
        self.maintain_scope
    }

    pub fn transform(&self, name: &str) -> Result<DepEntry> {
        let parsed = PackageName::parse(name);

        let key = if let Some(explicit) = self.explicit_rename(name) {
            explicit
        } else {
            let stripped = self.replace.strip(parsed.rest);
            if self.camelize {
                camelize(&stripped)
            } else {
                stripped.into_owned()
            }
        };

        if key.is_empty() {
            return Err(LoadError::EmptyKey {
                name: name.to_string(),
            });
        }

        debug!("renaming {} to {}", name, key);

        let namespace = parsed
            .scope
            .filter(|_| self.maintain_scope)
            .map(str::to_string);

        Ok(DepEntry {
            original_name: name.to_string(),
            key,
            namespace,
        })
    }

    /// Only an entry for the exact dependency name counts.
    fn explicit_rename(&self, name: &str) -> Option<String> {
        if let Some(k) = self.rename.get(name) {
            return Some(k.clone());
        }
        self.rename_fn.as_ref().map(|f| f(name))
    }
}
