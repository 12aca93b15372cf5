//! Plugin system for Toolbelt
//!
//! Plugins extend the toolbox without changes to the core: each one declares
//! metadata (id, version, dependencies), contributes commands and tools, and
//! participates in managed lifecycle hooks. The manager is the single owner
//! of plugin state; everything else observes it through read snapshots.
//!
//! # Architecture
//!
//! - **types**: `Plugin` and `PluginSource` traits, metadata and lifecycle
//!   state types, validation rules, `PluginConfig`
//! - **graph**: dependency graph with topological load/unload ordering and
//!   cycle detection
//! - **loader**: manifest-driven plugin source (`plugin.json` directories)
//!   and filesystem discovery
//! - **manager**: `PluginManager` driving load/unload/reload with serialized
//!   mutations and consistent reads

pub mod graph;
pub mod loader;
pub mod manager;
pub mod types;

pub use loader::{discover_plugin_paths, ManifestPluginSource};
pub use manager::PluginManager;
pub use types::{
    CommandSpec, Plugin, PluginConfig, PluginContext, PluginInfo, PluginMetadata, PluginSource,
    PluginState,
};
