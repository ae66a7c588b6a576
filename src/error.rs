use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Could not find dependencies. Do you have a package.json file in your project?")]
    ConfigNotFound,

    #[error("failed to read manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("invalid replace pattern '{pattern}': {source}")]
    InvalidReplacePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("dependency '{name}' resolves to an empty property name")]
    EmptyKey { name: String },

    #[error("{}", collision_message(.key, .first, .second, .cross_scope))]
    Collision {
        key: String,
        first: String,
        second: String,
        cross_scope: bool,
    },

    #[error("Cannot find module '{name}'")]
    ModuleNotFound { name: String },

    #[error("no plugin is registered under '{key}'")]
    UnknownKey { key: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoadError {
    pub fn module_not_found(name: impl Into<String>) -> Self {
        Self::ModuleNotFound { name: name.into() }
    }
}

fn collision_message(key: &str, first: &str, second: &str, cross_scope: &bool) -> String {
    if *cross_scope {
        format!(
            "Could not define the property \"{key}\", you may have repeated a dependency in another scope like \"{first}\" and \"{second}\""
        )
    } else {
        format!(
            "Could not define the property \"{key}\", you may have repeated dependencies in your package.json like \"{first}\" and \"{second}\""
        )
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
