use clap::Parser;
use std::path::PathBuf;

use plugload::{report::Format, Settings};

#[derive(Parser, Debug)]
#[command(name = "plugload", version, about)]
pub struct Args {
    /// Path to package.json (overrides PLUGLOAD_MANIFEST and discovery)
    #[arg(long, env = "PLUGLOAD_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Settings file (defaults to ./plugload.toml when present)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Plugin name pattern; repeat for several
    #[arg(long = "pattern", short = 'p')]
    pub patterns: Vec<String>,

    /// Add --pattern to the built-in patterns instead of replacing them
    #[arg(long, default_value_t = false)]
    pub extend_patterns: bool,

    /// Manifest sections to scan; repeat for several
    #[arg(long = "scope")]
    pub scopes: Vec<String>,

    /// Literal prefix to strip from plugin names
    #[arg(long)]
    pub replace_string: Option<String>,

    /// Load every plugin up front instead of on first access
    #[arg(long, default_value_t = false)]
    pub eager: bool,

    /// Keep names as written instead of camelCasing them
    #[arg(long, default_value_t = false)]
    pub no_camelize: bool,

    /// Put scoped packages at the top level instead of under their scope
    #[arg(long, default_value_t = false)]
    pub flatten_scopes: bool,

    /// Print one line per loaded plugin
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Command-line flags layered over the settings file.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(p) = &self.manifest {
            settings.manifest = Some(p.clone());
        }
        if !self.patterns.is_empty() {
            settings.pattern = plugload::config::StringOrList::Many(self.patterns.clone());
        }
        if self.extend_patterns {
            settings.override_pattern = false;
        }
        if !self.scopes.is_empty() {
            settings.scope = self.scopes.clone();
        }
        if let Some(r) = &self.replace_string {
            settings.replace_string = Some(r.clone());
            settings.replace_pattern = None;
        }
        if self.eager {
            settings.lazy = false;
        }
        if self.no_camelize {
            settings.camelize = false;
        }
        if self.flatten_scopes {
            settings.maintain_scope = false;
        }
        if self.debug {
            settings.debug = true;
        }
        settings
    }
}
