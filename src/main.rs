use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::Path;

use plugload::{
    config::SETTINGS_FILE, load_plugins_in, report, LoadOptions, ManifestSource, ProjectContext,
    Settings,
};

mod cli;
mod logging;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let settings = match &args.settings {
        Some(p) => Settings::load_from_path(p)?,
        None if Path::new(SETTINGS_FILE).is_file() => Settings::load_from_path(SETTINGS_FILE)?,
        None => Settings::default(),
    };
    let settings = args.apply(settings);

    logging::init_cli_logger(args.verbose, settings.debug);
    tracing::debug!("effective settings: {:?}", settings);

    let ctx = ProjectContext::new()?;
    let manifest_path = ctx
        .locate_manifest(settings.manifest.as_deref())
        .context("no manifest to read plugins from")?;

    let options = LoadOptions::new()
        .settings(settings)
        .manifest(ManifestSource::Path(manifest_path.clone()));

    let plugins = load_plugins_in(&ctx, options)
        .with_context(|| format!("failed to load plugins from {}", manifest_path.display()))?;

    // Lazy slots stay deferred in the report; eager ones show what resolved.
    let out = report::build_report(&plugins, Some(manifest_path.as_path()), args.format)?;
    print!("{out}");
    Ok(())
}
