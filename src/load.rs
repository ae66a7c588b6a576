use tracing::debug;

use crate::{
    config::{LoadOptions, ManifestSource},
    context::ProjectContext,
    debug::sink_for,
    deps::{check_unique, DepEntry},
    error::Result,
    manifest::DependencyMap,
    naming::NameTransformer,
    pattern::PatternSet,
    plugins::Plugins,
    resolve::ModuleResolver,
};

/// Finds the manifest from the current directory and builds the plugin
/// object.
pub fn load_plugins<M: 'static>(options: LoadOptions<M>) -> Result<Plugins<M>> {
    let ctx = ProjectContext::new()?;
    load_plugins_in(&ctx, options)
}

/// Same as [`load_plugins`] with an explicit project context.
///
/// Configuration problems (no manifest, bad pattern, empty or duplicate
/// keys) fail before any module is loaded.
pub fn load_plugins_in<M: 'static>(
    ctx: &ProjectContext,
    options: LoadOptions<M>,
) -> Result<Plugins<M>> {
    let LoadOptions {
        settings,
        mut manifest,
        loader,
        rename_fn,
        transforms,
        sink,
    } = options;

    debug!("loading plugins with settings: {:?}", settings);

    if let (ManifestSource::Discover, Some(p)) = (&manifest, settings.manifest.as_ref()) {
        manifest = ManifestSource::Path(p.clone());
    }

    let loaded = ctx.load(&manifest)?;
    let deps = DependencyMap::from_manifest(&loaded.value, &settings.scope);

    let patterns = PatternSet::from_settings(&settings.patterns(), settings.override_pattern)?;
    let matched = patterns.filter(deps.names());
    debug!("{} of {} dependencies match {:?}", matched.len(), deps.len(), patterns.patterns());

    let transformer = NameTransformer::new(settings.replace()?, settings.camelize, settings.maintain_scope)
        .with_rename(settings.rename.clone())
        .with_rename_fn(rename_fn);

    let entries = matched
        .into_iter()
        .map(|name| transformer.transform(name))
        .collect::<Result<Vec<DepEntry>>>()?;
    check_unique(&entries)?;

    let sink = match sink {
        Some(s) if settings.debug => s,
        _ => sink_for(settings.debug),
    };
    let resolver = ModuleResolver::new(loader, &loaded.base_dir, sink, settings.lazy)
        .with_transforms(transforms);

    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        let slot = resolver.resolve(&entry)?;
        resolved.push((entry, slot));
    }

    Plugins::assemble(resolved)
}
