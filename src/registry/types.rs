//! Tool registry types for Toolbelt
//!
//! Defines the metadata describing a registered tool, the closed category
//! set, search filters, registry configuration, and the derived statistics
//! projection.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Closed set of tool categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    File,
    Code,
    Git,
    Build,
    Test,
    Deploy,
    Utility,
    Api,
    Database,
    Other,
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToolCategory::File => "file",
            ToolCategory::Code => "code",
            ToolCategory::Git => "git",
            ToolCategory::Build => "build",
            ToolCategory::Test => "test",
            ToolCategory::Deploy => "deploy",
            ToolCategory::Utility => "utility",
            ToolCategory::Api => "api",
            ToolCategory::Database => "database",
            ToolCategory::Other => "other",
        };
        f.write_str(s)
    }
}

/// Metadata describing a registered tool.
///
/// A tool is a finer-grained, independently enumerable capability than a
/// plugin; plugins may register zero or more tools during initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Unique tool id within the registry.
    pub id: String,

    /// Human-readable tool name.
    pub name: String,

    /// Category from the closed set.
    pub category: ToolCategory,

    /// Semantic version string.
    pub version: String,

    /// Human-readable description.
    pub description: String,

    /// Unordered tag set for search/filtering.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether the tool is currently enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Optional author name or identifier.
    #[serde(default)]
    pub author: Option<String>,

    /// Other tool ids this tool requires.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Minimum toolbox version this tool supports.
    #[serde(default)]
    pub min_version: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// The contract a registered tool satisfies.
///
/// `validate`, `initialize`, and `cleanup` default to no-ops so simple tools
/// only implement `metadata` and `execute`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's metadata.
    fn metadata(&self) -> &ToolMetadata;

    /// Execute the tool against JSON parameters, returning a JSON result.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Self-check invoked before registration when `validate_on_register`
    /// is set.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Hook run when the tool is registered.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Best-effort hook run when the tool is unregistered.
    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}

/// Conjunctive search filter: a tool matches only if every provided
/// predicate holds. An empty filter matches every tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolFilter {
    /// Category equality.
    pub category: Option<ToolCategory>,

    /// Non-empty intersection with the tool's tags.
    pub tags: Vec<String>,

    /// Enabled-state equality.
    pub enabled: Option<bool>,

    /// Case-insensitive substring match against name or description.
    pub query: Option<String>,

    /// Author equality.
    pub author: Option<String>,
}

impl ToolFilter {
    /// Whether a tool's metadata satisfies every provided predicate.
    pub fn matches(&self, meta: &ToolMetadata) -> bool {
        if let Some(category) = self.category {
            if meta.category != category {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| meta.tags.contains(t)) {
            return false;
        }
        if let Some(enabled) = self.enabled {
            if meta.enabled != enabled {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let q = query.to_lowercase();
            if !meta.name.to_lowercase().contains(&q)
                && !meta.description.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if meta.author.as_deref() != Some(author.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Tool registry configuration, consumed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of registered tools. Zero means unbounded.
    pub max_tools: usize,

    /// Whether re-registering an existing id replaces the prior entry.
    pub allow_overrides: bool,

    /// Whether a tool must pass its `validate` hook before registration.
    pub validate_on_register: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_tools: 0,
            allow_overrides: false,
            validate_on_register: false,
        }
    }
}

/// Derived registry statistics, recomputed on demand from the live tool set.
/// Never persisted as authoritative state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatistics {
    pub total_tools: usize,
    pub enabled_tools: usize,
    pub disabled_tools: usize,
    /// Tool counts per category name.
    pub by_category: BTreeMap<String, usize>,
    /// Invocation counts per tool id, for tools executed at least once.
    pub invocations: BTreeMap<String, u64>,
    pub last_registered: Option<String>,
    pub last_unregistered: Option<String>,
}
