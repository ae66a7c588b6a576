//! Name matching for declared dependencies.
//!
//! Patterns are shell-style globs applied to package names:
//!
//! - `*` matches any run of characters except `/`
//! - `?` matches one character except `/`
//! - `[abc]` / `[a-z]` character classes
//! - `{a,b}` alternatives (expanded before compiling, nesting allowed)
//! - a leading `!` turns the pattern into an exclusion
//!
//! `@*/gulp{-,.}*` therefore matches `@myco/gulp-test` and `@myco/gulp.test`
//! but not `gulp-test`.

use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use tracing::trace;

use crate::error::{LoadError, Result};

pub const DEFAULT_PATTERNS: [&str; 3] = ["gulp-*", "gulp.*", "@*/gulp{-,.}*"];

/// Always appended so the loader package never exposes itself.
pub const SELF_EXCLUDE: &str = "!gulp-load-plugins";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
pub struct PatternSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    original: Vec<String>,
}

impl PatternSet {
    /// Compiles the given patterns as-is (no defaults, no self exclusion).
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        let mut original = Vec::with_capacity(patterns.len());

        for raw in patterns {
            let raw = raw.as_ref();
            original.push(raw.to_string());

            let (negated, body) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };

            for expanded in expand_braces(body) {
                let compiled =
                    Pattern::new(&expanded).map_err(|source| LoadError::InvalidPattern {
                        pattern: raw.to_string(),
                        source,
                    })?;
                if negated {
                    exclude.push(compiled);
                } else {
                    include.push(compiled);
                }
            }
        }

        Ok(Self {
            include,
            exclude,
            original,
        })
    }

    /// Builds the effective set: `pattern` either replaces the defaults or is
    /// appended to them, then the self exclusion is added.
    pub fn from_settings(pattern: &[String], override_pattern: bool) -> Result<Self> {
        let mut all: Vec<String> = Vec::new();

        if pattern.is_empty() || !override_pattern {
            all.extend(DEFAULT_PATTERNS.iter().map(|s| s.to_string()));
        }
        all.extend(pattern.iter().cloned());
        all.push(SELF_EXCLUDE.to_string());

        Self::new(&all)
    }

    pub fn patterns(&self) -> &[String] {
        &self.original
    }

    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|p| p.matches_with(name, MATCH_OPTIONS));

        included
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(name, MATCH_OPTIONS))
    }

    /// Returns the matching names in input order, each at most once.
    pub fn filter<'a, I>(&self, names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();

        for name in names {
            if !seen.insert(name) {
                continue;
            }
            if self.matches(name) {
                out.push(name);
            } else {
                trace!(name, "dependency does not match any plugin pattern");
            }
        }

        out
    }
}

/// Expands `{a,b}` alternatives into every concrete pattern.
///
/// Groups without a top-level comma (`{a}`) and unbalanced braces are left
/// literal.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((open, close)) = find_brace_group(pattern) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    let mut out = Vec::new();
    for alt in split_top_level(&pattern[open + 1..close]) {
        out.extend(expand_braces(&format!("{prefix}{alt}{suffix}")));
    }
    out
}

fn find_brace_group(pattern: &str) -> Option<(usize, usize)> {
    let bytes = pattern.as_bytes();
    let mut start = 0;

    while let Some(rel) = pattern[start..].find('{') {
        let open = start + rel;
        let mut depth = 0usize;
        let mut has_comma = false;
        let mut close = None;

        for (i, b) in bytes.iter().enumerate().skip(open) {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                b',' if depth == 1 => has_comma = true,
                _ => {}
            }
        }

        match close {
            Some(close) if has_comma => return Some((open, close)),
            Some(_) => start = open + 1,
            None => return None,
        }
    }

    None
}

fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;

    for (i, b) in body.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(&body[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[last..]);
    parts
}
