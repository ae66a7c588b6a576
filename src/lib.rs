pub mod config;
pub mod context;
pub mod debug;
pub mod deps;
pub mod error;
pub mod lazy;
pub mod load;
pub mod manifest;
pub mod naming;
pub mod pattern;
pub mod plugins;
pub mod report;
pub mod require;
pub mod resolve;

// Convenience re-exports
pub use config::{LoadOptions, ManifestSource, Settings};
pub use context::ProjectContext;
pub use debug::{DebugSink, MemorySink};
pub use error::{LoadError, Result};
pub use lazy::Lazy;
pub use load::{load_plugins, load_plugins_in};
pub use plugins::{Node, Plugin, Plugins};
pub use require::{Loader, ModuleInfo, NodeModulesLoader, Registry};
