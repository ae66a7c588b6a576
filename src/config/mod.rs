// src/config/mod.rs
use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
	error::Result,
	manifest::DEFAULT_SCOPES,
	naming::ReplaceString,
};

pub mod options;

pub use options::{LoadOptions, ManifestSource};

pub const SETTINGS_FILE: &str = "plugload.toml";

/// Small helper for serde defaults.
pub(crate) fn bool_true() -> bool {
	true
}

fn default_scopes() -> Vec<String> {
	DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// `pattern = "jack-*"` and `pattern = ["jack-*", "jill-*"]` both work.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
	One(String),
	Many(Vec<String>),
}

impl Default for StringOrList {
	fn default() -> Self {
		Self::Many(Vec::new())
	}
}

impl StringOrList {
	pub fn to_vec(&self) -> Vec<String> {
		match self {
			Self::One(s) => vec![s.clone()],
			Self::Many(v) => v.clone(),
		}
	}
}

/// Plain-data options; everything except the callables.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
	/// One line per loaded module.
	#[serde(default, alias = "DEBUG")]
	pub debug: bool,

	/// Empty means the built-in defaults.
	#[serde(default)]
	pub pattern: StringOrList,

	/// When false, `pattern` is added to the defaults instead of replacing them.
	#[serde(default = "bool_true")]
	pub override_pattern: bool,

	/// Manifest to read instead of the discovered `package.json`.
	#[serde(default)]
	pub manifest: Option<PathBuf>,

	/// Manifest sections scanned for names.
	#[serde(default = "default_scopes")]
	pub scope: Vec<String>,

	/// Literal prefix to strip.
	#[serde(default)]
	pub replace_string: Option<String>,

	/// Regex whose first match is stripped; wins over `replace_string`.
	#[serde(default)]
	pub replace_pattern: Option<String>,

	#[serde(default = "bool_true")]
	pub camelize: bool,

	#[serde(default = "bool_true")]
	pub lazy: bool,

	#[serde(default)]
	pub rename: BTreeMap<String, String>,

	#[serde(default = "bool_true")]
	pub maintain_scope: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: false,
			pattern: StringOrList::default(),
			override_pattern: true,
			manifest: None,
			scope: default_scopes(),
			replace_string: None,
			replace_pattern: None,
			camelize: true,
			lazy: true,
			rename: BTreeMap::new(),
			maintain_scope: true,
		}
	}
}

impl Settings {
	pub fn load_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read settings file {}", path.display()))?;
		let settings: Settings = toml::from_str(&text)
			.with_context(|| format!("failed to parse settings file {}", path.display()))?;
		Ok(settings)
	}

	pub fn patterns(&self) -> Vec<String> {
		self.pattern.to_vec()
	}

	pub fn replace(&self) -> Result<ReplaceString> {
		if let Some(raw) = self.replace_pattern.as_deref() {
			return ReplaceString::pattern(raw);
		}
		Ok(match self.replace_string.as_deref() {
			Some(prefix) => ReplaceString::literal(prefix),
			None => ReplaceString::default(),
		})
	}
}
