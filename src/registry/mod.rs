//! Tool registry for Toolbelt
//!
//! An in-memory catalog of discrete tools, finer-grained than plugins. Each
//! tool carries metadata (category, tags, enabled state), an execute
//! contract, and optional validate/initialize/cleanup hooks. Plugins
//! typically register tools from their `initialize` hook and unregister them
//! in `cleanup`, but the registry is independent of the plugin manager.
//!
//! # Architecture
//!
//! - **types**: `ToolMetadata`, `ToolCategory`, `ToolFilter`, `Tool` trait,
//!   `RegistryConfig`, `RegistryStatistics`
//! - **registry**: `ToolRegistry` with capacity/override enforcement,
//!   conjunctive search, and on-demand statistics

mod registry;
pub mod types;

pub use registry::ToolRegistry;
pub use types::{
    RegistryConfig, RegistryStatistics, Tool, ToolCategory, ToolFilter, ToolMetadata,
};
