//! Plugin types for Toolbelt
//!
//! This module defines the plugin contract: metadata, lifecycle states, the
//! `Plugin` capability trait every plugin must satisfy, the context handed to
//! plugins at initialization, and the `PluginSource` seam behind which plugin
//! loading happens.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolbeltError};
use crate::registry::ToolRegistry;

static PLUGIN_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9\-]{0,63}$").unwrap());

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.\-]+)?$").unwrap());

/// Identity and dependency declaration for a plugin.
///
/// Immutable once the plugin is loaded. The `id` must be unique among
/// currently loaded plugins; `dependencies` lists the plugin ids that must be
/// present and active before this plugin may initialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Unique, stable identifier. 1-64 characters, alphanumeric and hyphens,
    /// starting with an alphanumeric character.
    pub id: String,

    /// Human-readable plugin name.
    pub name: String,

    /// Semantic version string (e.g., "1.0.0").
    pub version: String,

    /// Human-readable description of what the plugin provides.
    pub description: String,

    /// Optional author name or identifier.
    #[serde(default)]
    pub author: Option<String>,

    /// Ordered list of plugin ids this plugin requires loaded and active first.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Validate a plugin's metadata shape.
///
/// Checks that the id is well-formed, the version parses as a semantic
/// version, and the name is non-empty. Dependency ids must themselves be
/// well-formed (their presence is checked later, against the live graph).
pub fn validate_metadata(metadata: &PluginMetadata) -> Result<()> {
    if !PLUGIN_ID_RE.is_match(&metadata.id) {
        return Err(ToolbeltError::Config(format!(
            "Invalid plugin id '{}': must be 1-64 alphanumeric characters and hyphens, starting with alphanumeric",
            metadata.id
        )));
    }

    if metadata.name.trim().is_empty() {
        return Err(ToolbeltError::Config(format!(
            "Plugin '{}' has an empty name",
            metadata.id
        )));
    }

    if !VERSION_RE.is_match(&metadata.version) {
        return Err(ToolbeltError::Config(format!(
            "Plugin '{}' has unparseable version '{}'",
            metadata.id, metadata.version
        )));
    }

    for dep in &metadata.dependencies {
        if !PLUGIN_ID_RE.is_match(dep) {
            return Err(ToolbeltError::Config(format!(
                "Plugin '{}' declares malformed dependency id '{}'",
                metadata.id, dep
            )));
        }
        if dep == &metadata.id {
            return Err(ToolbeltError::Config(format!(
                "Plugin '{}' declares itself as a dependency",
                metadata.id
            )));
        }
    }

    Ok(())
}

/// A CLI command contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Command name as surfaced in the toolbox CLI.
    pub name: String,

    /// One-line description shown in command listings.
    pub description: String,

    /// Usage string (e.g., "fmt [--check] <path>").
    #[serde(default)]
    pub usage: String,
}

/// Runtime lifecycle state of a plugin, driven only by the plugin manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    /// Raw reference obtained, metadata not yet read.
    Discovered,
    /// Metadata schema check in progress.
    Validating,
    /// Metadata invalid; the structured cause is reported, never retried.
    Rejected,
    /// Metadata valid, dependency ids recorded but unchecked.
    Resolved,
    /// Dependencies confirmed active, initialize hook running.
    Initializing,
    /// Initialization failed; excluded from commands and dependency satisfaction.
    Failed,
    /// Initialized; commands merged into the aggregate set.
    Active,
    /// Cleanup hook running.
    Unloading,
    /// Removed from the loaded set, id freed.
    Unloaded,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PluginState::Discovered => "discovered",
            PluginState::Validating => "validating",
            PluginState::Rejected => "rejected",
            PluginState::Resolved => "resolved",
            PluginState::Initializing => "initializing",
            PluginState::Failed => "failed",
            PluginState::Active => "active",
            PluginState::Unloading => "unloading",
            PluginState::Unloaded => "unloaded",
        };
        f.write_str(s)
    }
}

/// Public projection of a plugin, returned by manager operations and the
/// management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    /// True only when the plugin is in the `active` state.
    pub loaded: bool,
    pub dependencies: Vec<String>,
    /// Names of the commands this plugin contributes.
    pub commands: Vec<String>,
    /// Cause recorded for plugins stuck in the `failed` state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Capability bundle passed to a plugin at initialization.
///
/// Owned by the manager; a plugin must not hold it past `cleanup`. It grants
/// exactly the manager-level services the plugin is permitted to use: a
/// scoped data directory and the shared tool registry.
#[derive(Clone)]
pub struct PluginContext {
    /// Id of the plugin this context was created for.
    pub plugin_id: String,

    /// Per-plugin scratch directory under the toolbox data dir.
    pub data_dir: PathBuf,

    /// Shared tool registry the plugin may register tools into.
    pub registry: Arc<ToolRegistry>,

    /// This plugin's settings blob from `PluginConfig::settings`, `Null`
    /// when the config carries none.
    pub settings: serde_json::Value,
}

impl PluginContext {
    pub fn new(
        plugin_id: impl Into<String>,
        data_dir: PathBuf,
        registry: Arc<ToolRegistry>,
        settings: serde_json::Value,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            data_dir,
            registry,
            settings,
        }
    }
}

/// The contract every plugin must satisfy.
///
/// The manager drives plugins through their lifecycle exclusively via this
/// trait and never inspects plugin internals beyond it.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// The plugin's immutable metadata.
    fn metadata(&self) -> &PluginMetadata;

    /// Asynchronous initialization hook. Invoked once, with a fresh context,
    /// after every declared dependency has reached the active state.
    async fn initialize(&self, ctx: &PluginContext) -> Result<()>;

    /// The commands this plugin contributes while active.
    fn commands(&self) -> Vec<CommandSpec>;

    /// Asynchronous cleanup hook. Best-effort: failures are logged by the
    /// manager, never escalated out of the unload path.
    async fn cleanup(&self) -> Result<()>;
}

/// Resolves an external reference (typically a filesystem path) into a value
/// satisfying the plugin contract.
///
/// The platform-specific loading step lives behind this seam; the manager
/// only ever sees `Box<dyn Plugin>`.
#[async_trait]
pub trait PluginSource: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<Box<dyn Plugin>>;
}

/// Plugin system configuration, stored within the main config file.
///
/// Controls which directories are scanned for plugins and which plugins are
/// allowed or blocked at discovery time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Whether plugin discovery runs at startup.
    pub enabled: bool,

    /// Directories to scan for plugin subdirectories.
    pub plugin_dirs: Vec<String>,

    /// Allowlist of plugin ids. If empty, all discovered plugins are allowed.
    pub allowed_plugins: Vec<String>,

    /// Blocklist of plugin ids. Takes precedence over the allowlist.
    pub blocked_plugins: Vec<String>,

    /// Bounded budget for initialize/cleanup hooks, in seconds. A hook that
    /// exceeds it counts as failed so one misbehaving plugin cannot stall
    /// every future management request.
    pub hook_timeout_secs: u64,

    /// Optional per-plugin settings blobs, keyed by plugin id. Each plugin
    /// receives its own blob through `PluginContext::settings`.
    pub settings: HashMap<String, serde_json::Value>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            plugin_dirs: default_plugin_dirs(),
            allowed_plugins: Vec::new(),
            blocked_plugins: Vec::new(),
            hook_timeout_secs: 30,
            settings: HashMap::new(),
        }
    }
}

impl PluginConfig {
    /// Check whether a plugin id is permitted by the allow/block lists.
    ///
    /// A plugin is permitted if it is not blocked, and either the allowlist
    /// is empty or it appears in the allowlist.
    pub fn is_plugin_permitted(&self, id: &str) -> bool {
        if self.blocked_plugins.iter().any(|b| b == id) {
            return false;
        }
        if self.allowed_plugins.is_empty() {
            return true;
        }
        self.allowed_plugins.iter().any(|a| a == id)
    }
}

/// Returns the default plugin directories.
fn default_plugin_dirs() -> Vec<String> {
    vec!["~/.toolbelt/plugins".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(id: &str, version: &str, deps: &[&str]) -> PluginMetadata {
        PluginMetadata {
            id: id.to_string(),
            name: format!("Plugin {}", id),
            version: version.to_string(),
            description: "test".to_string(),
            author: None,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_validate_metadata_ok() {
        assert!(validate_metadata(&metadata("git-tools", "1.0.0", &[])).is_ok());
        assert!(validate_metadata(&metadata("a", "0.2.1-beta.1", &["base"])).is_ok());
    }

    #[test]
    fn test_validate_metadata_bad_id() {
        assert!(validate_metadata(&metadata("", "1.0.0", &[])).is_err());
        assert!(validate_metadata(&metadata("bad id", "1.0.0", &[])).is_err());
        assert!(validate_metadata(&metadata("-leading", "1.0.0", &[])).is_err());
        let long = "a".repeat(65);
        assert!(validate_metadata(&metadata(&long, "1.0.0", &[])).is_err());
    }

    #[test]
    fn test_validate_metadata_bad_version() {
        assert!(validate_metadata(&metadata("ok", "", &[])).is_err());
        assert!(validate_metadata(&metadata("ok", "one.two", &[])).is_err());
        assert!(validate_metadata(&metadata("ok", "1.0", &[])).is_err());
    }

    #[test]
    fn test_validate_metadata_empty_name() {
        let mut m = metadata("ok", "1.0.0", &[]);
        m.name = "  ".to_string();
        assert!(validate_metadata(&m).is_err());
    }

    #[test]
    fn test_validate_metadata_self_dependency() {
        let result = validate_metadata(&metadata("selfish", "1.0.0", &["selfish"]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("itself"));
    }

    #[test]
    fn test_validate_metadata_malformed_dependency() {
        assert!(validate_metadata(&metadata("ok", "1.0.0", &["bad dep"])).is_err());
    }

    #[test]
    fn test_plugin_state_display() {
        assert_eq!(PluginState::Active.to_string(), "active");
        assert_eq!(PluginState::Failed.to_string(), "failed");
        assert_eq!(PluginState::Unloaded.to_string(), "unloaded");
    }

    #[test]
    fn test_plugin_info_wire_shape() {
        let info = PluginInfo {
            id: "fmt".to_string(),
            name: "Formatter".to_string(),
            version: "1.0.0".to_string(),
            loaded: true,
            dependencies: vec![],
            commands: vec!["fmt".to_string()],
            error: None,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["id"], "fmt");
        assert_eq!(json["loaded"], true);
        // failed-state cause is omitted when absent
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_plugin_config_defaults() {
        let config = PluginConfig::default();
        assert!(config.enabled);
        assert_eq!(config.plugin_dirs, vec!["~/.toolbelt/plugins"]);
        assert_eq!(config.hook_timeout_secs, 30);
        assert!(config.allowed_plugins.is_empty());
        assert!(config.blocked_plugins.is_empty());
    }

    #[test]
    fn test_plugin_config_deserialization_defaults() {
        let config: PluginConfig = serde_json::from_str("{}").unwrap();
        assert!(config.enabled);
        assert_eq!(config.plugin_dirs, vec!["~/.toolbelt/plugins"]);
    }

    #[test]
    fn test_plugin_config_permit_rules() {
        let mut config = PluginConfig::default();
        assert!(config.is_plugin_permitted("anything"));

        config.allowed_plugins = vec!["good".to_string()];
        assert!(config.is_plugin_permitted("good"));
        assert!(!config.is_plugin_permitted("other"));

        config.blocked_plugins = vec!["good".to_string()];
        // Blocklist takes precedence
        assert!(!config.is_plugin_permitted("good"));
    }
}
