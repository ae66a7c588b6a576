// src/config/options.rs
use std::{collections::BTreeMap, fmt, path::PathBuf, rc::Rc};

use serde_json::Value;

use super::{Settings, StringOrList};
use crate::{
	debug::{DebugSink, SharedSink},
	naming::RenameFn,
	require::{Loader, ModuleInfo, NodeModulesLoader},
	resolve::{SharedLoader, Transform},
};

/// Where the dependency declarations come from.
#[derive(Debug, Clone, Default)]
pub enum ManifestSource {
	/// Nearest `package.json` from the working directory.
	#[default]
	Discover,
	/// A manifest file on disk.
	Path(PathBuf),
	/// An already-parsed manifest.
	Value(Value),
	/// Explicitly no manifest; loading fails with "configuration not found".
	Missing,
}

/// Everything `load_plugins` needs: settings plus the injectable callables.
pub struct LoadOptions<M> {
	pub settings: Settings,
	pub manifest: ManifestSource,
	pub(crate) loader: SharedLoader<M>,
	pub(crate) rename_fn: Option<RenameFn>,
	pub(crate) transforms: BTreeMap<String, Transform<M>>,
	pub(crate) sink: Option<SharedSink>,
}

impl Default for LoadOptions<ModuleInfo> {
	fn default() -> Self {
		Self::with_loader(NodeModulesLoader)
	}
}

impl LoadOptions<ModuleInfo> {
	/// Options that resolve plugins from `node_modules`.
	pub fn new() -> Self {
		Self::default()
	}
}

impl<M> fmt::Debug for LoadOptions<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoadOptions")
			.field("settings", &self.settings)
			.field("manifest", &self.manifest)
			.field("rename_fn", &self.rename_fn.is_some())
			.field("transforms", &self.transforms.keys().collect::<Vec<_>>())
			.field("debug_sink", &self.sink.is_some())
			.finish()
	}
}

impl<M> LoadOptions<M> {
	pub fn with_loader<L>(loader: L) -> Self
	where
		L: Loader<M> + 'static,
	{
		Self {
			settings: Settings::default(),
			manifest: ManifestSource::Discover,
			loader: Rc::new(loader),
			rename_fn: None,
			transforms: BTreeMap::new(),
			sink: None,
		}
	}

	pub fn settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	pub fn manifest(mut self, source: ManifestSource) -> Self {
		self.manifest = source;
		self
	}

	pub fn manifest_value(self, value: Value) -> Self {
		self.manifest(ManifestSource::Value(value))
	}

	pub fn manifest_path(self, path: impl Into<PathBuf>) -> Self {
		self.manifest(ManifestSource::Path(path.into()))
	}

	pub fn pattern<S: Into<String>>(mut self, pattern: S) -> Self {
		self.settings.pattern = StringOrList::One(pattern.into());
		self
	}

	pub fn patterns<I, S>(mut self, patterns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.settings.pattern = StringOrList::Many(patterns.into_iter().map(Into::into).collect());
		self
	}

	pub fn override_pattern(mut self, on: bool) -> Self {
		self.settings.override_pattern = on;
		self
	}

	pub fn scope<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.settings.scope = scopes.into_iter().map(Into::into).collect();
		self
	}

	pub fn replace_string(mut self, prefix: impl Into<String>) -> Self {
		self.settings.replace_string = Some(prefix.into());
		self.settings.replace_pattern = None;
		self
	}

	pub fn replace_pattern(mut self, regex: impl Into<String>) -> Self {
		self.settings.replace_pattern = Some(regex.into());
		self
	}

	pub fn camelize(mut self, on: bool) -> Self {
		self.settings.camelize = on;
		self
	}

	pub fn lazy(mut self, on: bool) -> Self {
		self.settings.lazy = on;
		self
	}

	pub fn maintain_scope(mut self, on: bool) -> Self {
		self.settings.maintain_scope = on;
		self
	}

	pub fn debug(mut self, on: bool) -> Self {
		self.settings.debug = on;
		self
	}

	pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
		self.settings.rename.insert(from.into(), to.into());
		self
	}

	pub fn rename_fn<F>(mut self, f: F) -> Self
	where
		F: Fn(&str) -> String + 'static,
	{
		self.rename_fn = Some(Rc::new(f));
		self
	}

	/// Applied to the module loaded for `key` (bare key or "scope.key").
	pub fn post_require_transform<F>(mut self, key: impl Into<String>, f: F) -> Self
	where
		F: Fn(M) -> M + 'static,
	{
		self.transforms.insert(key.into(), Rc::new(f));
		self
	}

	/// Replaces where debug lines go; only used while `debug` is on.
	pub fn debug_sink<S>(mut self, sink: S) -> Self
	where
		S: DebugSink + 'static,
	{
		self.sink = Some(Rc::new(sink));
		self
	}
}
