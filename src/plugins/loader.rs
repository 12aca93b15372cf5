//! Manifest-driven plugin loading for Toolbelt
//!
//! The shipped `PluginSource` resolves a plugin directory containing a
//! `plugin.json` manifest into a value satisfying the plugin contract. The
//! manifest declares the plugin's identity, its dependencies on other
//! plugins, the CLI commands it contributes, and the tools it registers into
//! the shared registry. Tools wrap external command templates with
//! `{{param}}` interpolation.
//!
//! # Example plugin.json
//!
//! ```json
//! {
//!   "id": "git-tools",
//!   "name": "Git Tools",
//!   "version": "1.0.0",
//!   "description": "Git integration for the toolbox",
//!   "dependencies": [],
//!   "commands": [
//!     { "name": "git-status", "description": "Show working tree status", "usage": "git-status <path>" }
//!   ],
//!   "tools": [
//!     {
//!       "id": "git_status",
//!       "name": "git status",
//!       "category": "git",
//!       "description": "Porcelain git status",
//!       "command": "git -C {{path}} status --porcelain",
//!       "timeout_secs": 10
//!     }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{Result, ToolbeltError};
use crate::registry::{Tool, ToolCategory, ToolMetadata, ToolRegistry};

use super::types::{
    validate_metadata, CommandSpec, Plugin, PluginConfig, PluginContext, PluginMetadata,
    PluginSource,
};

static COMMAND_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_\-]{0,63}$").unwrap());

/// The manifest loaded from a plugin's `plugin.json` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin id. 1-64 alphanumeric characters and hyphens.
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

    /// Plugin ids that must be loaded and active before this plugin.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// CLI commands contributed by this plugin.
    #[serde(default)]
    pub commands: Vec<CommandSpec>,

    /// Tool definitions registered into the shared registry on initialize.
    #[serde(default)]
    pub tools: Vec<ManifestToolDef>,
}

impl PluginManifest {
    /// Project the manifest into the manager-facing metadata.
    pub fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            dependencies: self.dependencies.clone(),
        }
    }
}

/// A tool definition within a plugin manifest.
///
/// Wraps an external command template executed when the tool is invoked.
/// Parameter interpolation uses `{{param_name}}` syntax within the command
/// string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestToolDef {
    /// Tool id as registered in the tool registry.
    pub id: String,

    /// Human-readable tool name.
    pub name: String,

    /// Category from the closed set. Defaults to `other`.
    #[serde(default = "default_category")]
    pub category: ToolCategory,

    /// Description shown in tool listings.
    pub description: String,

    /// Unordered tag set for search.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Command template. Uses `{{param_name}}` for parameter interpolation.
    /// Must not contain shell chaining operators (&&, ||, ;, |, backticks).
    pub command: String,

    /// Optional working directory for command execution. Relative paths are
    /// resolved against the plugin directory.
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Optional timeout in seconds. Defaults to 30.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Optional environment variables set during execution.
    #[serde(default)]
    pub env: Option<HashMap<String, String>>,
}

fn default_category() -> ToolCategory {
    ToolCategory::Other
}

impl ManifestToolDef {
    /// Returns the effective timeout in seconds, defaulting to 30.
    pub fn effective_timeout(&self) -> u64 {
        self.timeout_secs.unwrap_or(30)
    }
}

/// Load and validate a manifest from a plugin directory.
pub fn load_manifest(dir: &Path) -> Result<PluginManifest> {
    let manifest_path = dir.join("plugin.json");

    if !manifest_path.exists() {
        return Err(ToolbeltError::Config(format!(
            "No plugin.json found in {}",
            dir.display()
        )));
    }

    let content = fs::read_to_string(&manifest_path).map_err(|e| {
        ToolbeltError::Config(format!("Failed to read {}: {}", manifest_path.display(), e))
    })?;

    let manifest: PluginManifest = serde_json::from_str(&content)?;

    validate_manifest(&manifest)?;

    Ok(manifest)
}

/// Validate a plugin manifest for correctness and safety.
///
/// Checks the metadata shape (id, name, version, dependency ids), command
/// name shapes, tool id shapes, and rejects command templates containing
/// shell chaining operators.
pub fn validate_manifest(manifest: &PluginManifest) -> Result<()> {
    validate_metadata(&manifest.metadata())?;

    for command in &manifest.commands {
        if !COMMAND_NAME_RE.is_match(&command.name) {
            return Err(ToolbeltError::Config(format!(
                "Invalid command name '{}' in plugin '{}': must be 1-64 alphanumeric characters, hyphens, and underscores, starting with a letter",
                command.name, manifest.id
            )));
        }
    }

    for tool in &manifest.tools {
        if !COMMAND_NAME_RE.is_match(&tool.id) {
            return Err(ToolbeltError::Config(format!(
                "Invalid tool id '{}' in plugin '{}'",
                tool.id, manifest.id
            )));
        }
        validate_command_safety(&tool.command, &tool.id, &manifest.id)?;
    }

    Ok(())
}

/// Check a command template for shell chaining operators.
///
/// Rejects commands containing `&&`, `||`, `;`, `|`, or backticks so a
/// manifest cannot smuggle arbitrary command chains through interpolation.
fn validate_command_safety(command: &str, tool_id: &str, plugin_id: &str) -> Result<()> {
    let dangerous_patterns: &[(&str, &str)] = &[
        ("&&", "command chaining (&&)"),
        ("||", "conditional chaining (||)"),
        (";", "command separator (;)"),
        ("`", "backtick execution"),
    ];

    for (pattern, description) in dangerous_patterns {
        if command.contains(pattern) {
            return Err(ToolbeltError::Config(format!(
                "Tool '{}' in plugin '{}' contains dangerous pattern: {}",
                tool_id, plugin_id, description
            )));
        }
    }

    // `||` is caught above; reject any remaining single pipe.
    if command.contains('|') {
        return Err(ToolbeltError::Config(format!(
            "Tool '{}' in plugin '{}' contains dangerous pattern: pipe operator (|)",
            tool_id, plugin_id
        )));
    }

    Ok(())
}

/// Interpolate `{{param}}` placeholders from a JSON object of parameters.
///
/// Fails if a placeholder has no corresponding parameter. Non-string scalars
/// are rendered with their JSON representation.
pub fn interpolate_command(template: &str, params: &Value) -> Result<String> {
    static PLACEHOLDER_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}").unwrap());

    let mut result = String::with_capacity(template.len());
    let mut last = 0;
    for cap in PLACEHOLDER_RE.captures_iter(template) {
        let whole = cap.get(0).unwrap();
        let key = &cap[1];
        let value = params.get(key).ok_or_else(|| {
            ToolbeltError::InvalidRequest(format!("Missing parameter '{}' for command", key))
        })?;
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        result.push_str(&template[last..whole.start()]);
        result.push_str(&rendered);
        last = whole.end();
    }
    result.push_str(&template[last..]);
    Ok(result)
}

/// A tool backed by a manifest command template.
struct ManifestTool {
    metadata: ToolMetadata,
    def: ManifestToolDef,
    plugin_dir: PathBuf,
}

#[async_trait]
impl Tool for ManifestTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let command_line = interpolate_command(&self.def.command, &params)?;
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            ToolbeltError::Registry(format!("Tool '{}' has an empty command", self.metadata.id))
        })?;

        let mut command = tokio::process::Command::new(program);
        command.args(parts);
        command.kill_on_drop(true);

        let working_dir = match &self.def.working_dir {
            Some(dir) => {
                let path = PathBuf::from(dir);
                if path.is_absolute() {
                    path
                } else {
                    self.plugin_dir.join(path)
                }
            }
            None => self.plugin_dir.clone(),
        };
        command.current_dir(working_dir);

        if let Some(env) = &self.def.env {
            command.envs(env);
        }

        let timeout = Duration::from_secs(self.def.effective_timeout());
        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| {
                ToolbeltError::Registry(format!(
                    "Tool '{}' timed out after {}s",
                    self.metadata.id,
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                ToolbeltError::Registry(format!(
                    "Tool '{}' failed to spawn '{}': {}",
                    self.metadata.id, program, e
                ))
            })?;

        Ok(json!({
            "exit_code": output.status.code(),
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
        }))
    }
}

/// A plugin materialized from a `plugin.json` manifest.
///
/// Its commands come straight from the manifest; on initialize it registers
/// the manifest's tools into the shared registry, and on cleanup it
/// unregisters them again.
pub struct ManifestPlugin {
    metadata: PluginMetadata,
    manifest: PluginManifest,
    path: PathBuf,
    /// Registry handle captured at initialize so cleanup can unregister.
    registered: Mutex<Option<(Arc<ToolRegistry>, Vec<String>)>>,
}

impl ManifestPlugin {
    pub fn new(manifest: PluginManifest, path: PathBuf) -> Self {
        Self {
            metadata: manifest.metadata(),
            manifest,
            path,
            registered: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Plugin for ManifestPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn initialize(&self, ctx: &PluginContext) -> Result<()> {
        let mut registered_ids = Vec::with_capacity(self.manifest.tools.len());

        for def in &self.manifest.tools {
            let tool = Arc::new(ManifestTool {
                metadata: ToolMetadata {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    category: def.category,
                    version: self.metadata.version.clone(),
                    description: def.description.clone(),
                    tags: def.tags.clone(),
                    enabled: true,
                    author: self.metadata.author.clone(),
                    dependencies: vec![],
                    min_version: None,
                },
                def: def.clone(),
                plugin_dir: self.path.clone(),
            });
            ctx.registry.register(tool).await?;
            registered_ids.push(def.id.clone());
        }

        info!(
            plugin = %self.metadata.id,
            tools = registered_ids.len(),
            commands = self.manifest.commands.len(),
            "Initialized manifest plugin"
        );

        let mut guard = self.registered.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some((ctx.registry.clone(), registered_ids));
        Ok(())
    }

    fn commands(&self) -> Vec<CommandSpec> {
        self.manifest.commands.clone()
    }

    async fn cleanup(&self) -> Result<()> {
        let registered = {
            let mut guard = self.registered.lock().unwrap_or_else(|p| p.into_inner());
            guard.take()
        };
        if let Some((registry, ids)) = registered {
            for id in ids {
                if let Err(e) = registry.unregister(&id).await {
                    warn!(plugin = %self.metadata.id, tool = %id, error = %e, "Failed to unregister tool during cleanup");
                }
            }
        }
        Ok(())
    }
}

/// `PluginSource` that resolves filesystem paths into manifest plugins.
#[derive(Debug, Clone, Default)]
pub struct ManifestPluginSource;

#[async_trait]
impl PluginSource for ManifestPluginSource {
    async fn resolve(&self, reference: &str) -> Result<Box<dyn Plugin>> {
        let dir = expand_tilde(reference);
        let manifest = load_manifest(&dir)?;
        Ok(Box::new(ManifestPlugin::new(manifest, dir)))
    }
}

/// Discover plugin directories across the configured scan roots.
///
/// Scans each directory for subdirectories containing a `plugin.json` file.
/// Manifests that fail to parse or validate, and plugins denied by the
/// allow/block lists, are logged and skipped; discovery itself only fails on
/// an unreadable scan root.
pub fn discover_plugin_paths(config: &PluginConfig) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for dir in &config.plugin_dirs {
        let dir = expand_tilde(dir);
        if !dir.exists() {
            info!(dir = %dir.display(), "Plugin directory does not exist, skipping");
            continue;
        }
        if !dir.is_dir() {
            warn!(path = %dir.display(), "Plugin path is not a directory, skipping");
            continue;
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            ToolbeltError::Config(format!(
                "Failed to read plugin directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        for entry in entries {
            let entry = entry
                .map_err(|e| ToolbeltError::Config(format!("Failed to read directory entry: {}", e)))?;
            let entry_path = entry.path();
            if !entry_path.is_dir() || !entry_path.join("plugin.json").exists() {
                continue;
            }

            match load_manifest(&entry_path) {
                Ok(manifest) => {
                    if !config.is_plugin_permitted(&manifest.id) {
                        info!(plugin = %manifest.id, "Plugin denied by allow/block lists, skipping");
                        continue;
                    }
                    info!(
                        plugin = %manifest.id,
                        version = %manifest.version,
                        dir = %entry_path.display(),
                        "Discovered plugin"
                    );
                    paths.push(entry_path);
                }
                Err(e) => {
                    warn!(
                        dir = %entry_path.display(),
                        error = %e,
                        "Failed to load plugin manifest, skipping"
                    );
                }
            }
        }
    }

    Ok(paths)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_manifest() -> PluginManifest {
        PluginManifest {
            id: "test-plugin".to_string(),
            name: "Test Plugin".to_string(),
            version: "1.0.0".to_string(),
            description: "A test plugin".to_string(),
            author: None,
            dependencies: vec![],
            commands: vec![CommandSpec {
                name: "hello".to_string(),
                description: "Says hello".to_string(),
                usage: "hello".to_string(),
            }],
            tools: vec![ManifestToolDef {
                id: "echo_tool".to_string(),
                name: "Echo".to_string(),
                category: ToolCategory::Utility,
                description: "Echoes input".to_string(),
                tags: vec![],
                command: "echo {{input}}".to_string(),
                working_dir: None,
                timeout_secs: None,
                env: None,
            }],
        }
    }

    fn write_plugin_json(dir: &Path, manifest: &PluginManifest) {
        let content = serde_json::to_string_pretty(manifest).unwrap();
        fs::write(dir.join("plugin.json"), content).unwrap();
    }

    // ---- manifest loading ----

    #[test]
    fn test_load_manifest_valid() {
        let tmp = TempDir::new().unwrap();
        write_plugin_json(tmp.path(), &valid_manifest());

        let manifest = load_manifest(tmp.path()).unwrap();
        assert_eq!(manifest.id, "test-plugin");
        assert_eq!(manifest.commands.len(), 1);
        assert_eq!(manifest.tools[0].effective_timeout(), 30);
    }

    #[test]
    fn test_load_manifest_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_manifest(tmp.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("No plugin.json"));
    }

    #[test]
    fn test_load_manifest_malformed_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("plugin.json"), "{ broken").unwrap();
        assert!(load_manifest(tmp.path()).is_err());
    }

    #[test]
    fn test_load_manifest_missing_required_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("plugin.json"),
            r#"{"id": "incomplete", "version": "1.0.0"}"#,
        )
        .unwrap();
        assert!(load_manifest(tmp.path()).is_err());
    }

    // ---- validation ----

    #[test]
    fn test_validate_manifest_valid() {
        assert!(validate_manifest(&valid_manifest()).is_ok());
    }

    #[test]
    fn test_validate_manifest_bad_id() {
        let mut manifest = valid_manifest();
        manifest.id = "bad id!".to_string();
        assert!(validate_manifest(&manifest).is_err());
    }

    #[test]
    fn test_validate_manifest_bad_version() {
        let mut manifest = valid_manifest();
        manifest.version = "not-a-version".to_string();
        assert!(validate_manifest(&manifest).is_err());
    }

    #[test]
    fn test_validate_manifest_bad_command_name() {
        let mut manifest = valid_manifest();
        manifest.commands[0].name = "has spaces".to_string();
        let result = validate_manifest(&manifest);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid command name"));
    }

    #[test]
    fn test_validate_manifest_dangerous_commands() {
        for bad in [
            "echo hi && rm -rf /",
            "echo hi || true",
            "echo hi; date",
            "cat f | grep x",
            "echo `whoami`",
        ] {
            let mut manifest = valid_manifest();
            manifest.tools[0].command = bad.to_string();
            assert!(
                validate_manifest(&manifest).is_err(),
                "expected rejection of {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_validate_manifest_safe_template_command() {
        let mut manifest = valid_manifest();
        manifest.tools[0].command = "git -C {{path}} status --porcelain".to_string();
        assert!(validate_manifest(&manifest).is_ok());
    }

    // ---- interpolation ----

    #[test]
    fn test_interpolate_command() {
        let out = interpolate_command(
            "git -C {{path}} log -n {{count}}",
            &serde_json::json!({ "path": "/repo", "count": 5 }),
        )
        .unwrap();
        assert_eq!(out, "git -C /repo log -n 5");
    }

    #[test]
    fn test_interpolate_missing_param() {
        let result = interpolate_command("echo {{missing}}", &serde_json::json!({}));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing"));
    }

    #[test]
    fn test_interpolate_whitespace_in_braces() {
        let out =
            interpolate_command("echo {{ name }}", &serde_json::json!({ "name": "hi" })).unwrap();
        assert_eq!(out, "echo hi");
    }

    // ---- discovery ----

    #[test]
    fn test_discover_finds_valid_plugins() {
        let tmp = TempDir::new().unwrap();
        let plugin_dir = tmp.path().join("test-plugin");
        fs::create_dir(&plugin_dir).unwrap();
        write_plugin_json(&plugin_dir, &valid_manifest());

        let config = PluginConfig {
            plugin_dirs: vec![tmp.path().to_string_lossy().into_owned()],
            ..Default::default()
        };
        let paths = discover_plugin_paths(&config).unwrap();
        assert_eq!(paths, vec![plugin_dir]);
    }

    #[test]
    fn test_discover_skips_invalid_and_missing() {
        let tmp = TempDir::new().unwrap();

        let good = tmp.path().join("good");
        fs::create_dir(&good).unwrap();
        write_plugin_json(&good, &valid_manifest());

        let bad = tmp.path().join("bad");
        fs::create_dir(&bad).unwrap();
        fs::write(bad.join("plugin.json"), "{ broken json").unwrap();

        fs::create_dir(tmp.path().join("no-manifest")).unwrap();
        fs::write(tmp.path().join("a-file.txt"), "hello").unwrap();

        let config = PluginConfig {
            plugin_dirs: vec![tmp.path().to_string_lossy().into_owned()],
            ..Default::default()
        };
        let paths = discover_plugin_paths(&config).unwrap();
        assert_eq!(paths, vec![good]);
    }

    #[test]
    fn test_discover_nonexistent_dir_is_empty() {
        let config = PluginConfig {
            plugin_dirs: vec!["/nonexistent/toolbelt/plugins".to_string()],
            ..Default::default()
        };
        assert!(discover_plugin_paths(&config).unwrap().is_empty());
    }

    #[test]
    fn test_discover_honors_blocklist() {
        let tmp = TempDir::new().unwrap();
        let plugin_dir = tmp.path().join("test-plugin");
        fs::create_dir(&plugin_dir).unwrap();
        write_plugin_json(&plugin_dir, &valid_manifest());

        let config = PluginConfig {
            plugin_dirs: vec![tmp.path().to_string_lossy().into_owned()],
            blocked_plugins: vec!["test-plugin".to_string()],
            ..Default::default()
        };
        assert!(discover_plugin_paths(&config).unwrap().is_empty());
    }

    // ---- source + plugin behavior ----

    #[tokio::test]
    async fn test_source_resolves_manifest_plugin() {
        let tmp = TempDir::new().unwrap();
        write_plugin_json(tmp.path(), &valid_manifest());

        let source = ManifestPluginSource;
        let plugin = source
            .resolve(&tmp.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(plugin.metadata().id, "test-plugin");
        assert_eq!(plugin.commands().len(), 1);
        assert_eq!(plugin.commands()[0].name, "hello");
    }

    #[tokio::test]
    async fn test_source_rejects_invalid_reference() {
        let tmp = TempDir::new().unwrap();
        let source = ManifestPluginSource;
        assert!(source
            .resolve(&tmp.path().to_string_lossy())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_initialize_registers_and_cleanup_unregisters_tools() {
        let tmp = TempDir::new().unwrap();
        write_plugin_json(tmp.path(), &valid_manifest());
        let plugin = ManifestPlugin::new(load_manifest(tmp.path()).unwrap(), tmp.path().into());

        let registry = Arc::new(ToolRegistry::default());
        let ctx = PluginContext::new(
            "test-plugin",
            tmp.path().into(),
            registry.clone(),
            serde_json::Value::Null,
        );

        plugin.initialize(&ctx).await.unwrap();
        assert!(registry.contains("echo_tool").await);

        plugin.cleanup().await.unwrap();
        assert!(!registry.contains("echo_tool").await);
    }

    #[tokio::test]
    async fn test_manifest_tool_executes_command() {
        let tmp = TempDir::new().unwrap();
        write_plugin_json(tmp.path(), &valid_manifest());
        let plugin = ManifestPlugin::new(load_manifest(tmp.path()).unwrap(), tmp.path().into());

        let registry = Arc::new(ToolRegistry::default());
        let ctx = PluginContext::new(
            "test-plugin",
            tmp.path().into(),
            registry.clone(),
            serde_json::Value::Null,
        );
        plugin.initialize(&ctx).await.unwrap();

        let out = registry
            .execute_tool("echo_tool", serde_json::json!({ "input": "hi" }))
            .await
            .unwrap();
        assert_eq!(out["exit_code"], 0);
        assert!(out["stdout"].as_str().unwrap().contains("hi"));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("rel/path"), PathBuf::from("rel/path"));
    }
}
