use serde::Serialize;
use std::path::Path;

use crate::{plugins::Plugins, require::ModuleInfo};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    key: String,
    dependency: &'a str,
    loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<&'a ModuleInfo>,
}

fn rows(plugins: &Plugins<ModuleInfo>) -> Vec<Row<'_>> {
    plugins
        .iter()
        .map(|(key, p)| Row {
            key,
            dependency: &p.name,
            loaded: p.is_loaded(),
            module: if p.is_loaded() { p.get().ok() } else { None },
        })
        .collect()
}

pub fn build_report(
    plugins: &Plugins<ModuleInfo>,
    manifest: Option<&Path>,
    format: Format,
) -> anyhow::Result<String> {
    match format {
        Format::Text => Ok(summary(plugins, manifest)),
        Format::Json => {
            let mut out = serde_json::to_string_pretty(&rows(plugins))?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn summary(plugins: &Plugins<ModuleInfo>, manifest: Option<&Path>) -> String {
    let mut out = String::new();

    out.push_str("plugload report\n");
    out.push_str("===============\n");
    out.push_str(&format!(
        "manifest: {}\n",
        manifest
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<in-memory>".to_string())
    ));
    out.push_str(&format!("plugins: {}\n", plugins.len()));

    let rows = rows(plugins);
    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);

    for r in rows {
        out.push_str(&format!("  {:width$}  <- {}", r.key, r.dependency));
        match r.module {
            Some(m) => out.push_str(&format!(
                " ({}, {})\n",
                m.version.as_deref().unwrap_or("unversioned"),
                m.dir.display()
            )),
            None => out.push_str(" (deferred)\n"),
        }
    }

    out
}
