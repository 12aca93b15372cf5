//! In-memory tool registry for Toolbelt
//!
//! The registry is the process-wide catalog of discrete tools. It owns all
//! tool state: nothing outside this module mutates the tool map. Plugins
//! receive an `Arc<ToolRegistry>` through their context and register tools
//! from their `initialize` hook.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{Result, ToolbeltError};

use super::types::{RegistryConfig, RegistryStatistics, Tool, ToolFilter, ToolMetadata};

#[derive(Default)]
struct RegistryInner {
    tools: HashMap<String, Arc<dyn Tool>>,
    invocations: HashMap<String, u64>,
    last_registered: Option<String>,
    last_unregistered: Option<String>,
}

/// Catalog of registered tools with capacity and override policies.
///
/// All methods take `&self`; the tool map lives behind an async `RwLock` so
/// concurrent readers (search, statistics) never block each other.
pub struct ToolRegistry {
    config: RegistryConfig,
    inner: RwLock<RegistryInner>,
}

impl ToolRegistry {
    /// Create a registry with the given policy configuration.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Register a tool.
    ///
    /// Fails if the configured `max_tools` bound would be exceeded, or if the
    /// id already exists and `allow_overrides` is false. When
    /// `validate_on_register` is set, the tool must report itself valid
    /// first. The tool's `initialize` hook runs before insertion; its failure
    /// fails the registration and leaves the registry unchanged.
    pub async fn register(&self, tool: Arc<dyn Tool>) -> Result<()> {
        let id = tool.metadata().id.clone();

        if self.config.validate_on_register {
            tool.validate().map_err(|e| {
                ToolbeltError::Registry(format!("Tool '{}' failed validation: {}", id, e))
            })?;
        }

        {
            let inner = self.inner.read().await;
            let is_new = !inner.tools.contains_key(&id);
            if !is_new && !self.config.allow_overrides {
                return Err(ToolbeltError::Registry(format!(
                    "Tool id '{}' is already registered and overrides are disabled",
                    id
                )));
            }
            if is_new && self.config.max_tools > 0 && inner.tools.len() >= self.config.max_tools {
                return Err(ToolbeltError::Registry(format!(
                    "Registry is full ({} tools): cannot register '{}'",
                    self.config.max_tools, id
                )));
            }
        }

        tool.initialize().await.map_err(|e| {
            ToolbeltError::Registry(format!("Tool '{}' failed to initialize: {}", id, e))
        })?;

        let mut inner = self.inner.write().await;
        // Re-check under the write lock: a concurrent register may have won.
        let is_new = !inner.tools.contains_key(&id);
        if !is_new && !self.config.allow_overrides {
            return Err(ToolbeltError::Registry(format!(
                "Tool id '{}' is already registered and overrides are disabled",
                id
            )));
        }
        if is_new && self.config.max_tools > 0 && inner.tools.len() >= self.config.max_tools {
            return Err(ToolbeltError::Registry(format!(
                "Registry is full ({} tools): cannot register '{}'",
                self.config.max_tools, id
            )));
        }

        let replaced = inner.tools.insert(id.clone(), tool).is_some();
        inner.last_registered = Some(id.clone());
        info!(tool = %id, replaced, "Registered tool");
        Ok(())
    }

    /// Unregister a tool by id.
    ///
    /// Runs the tool's `cleanup` hook best-effort: a failing hook is logged
    /// and the tool is removed regardless.
    pub async fn unregister(&self, id: &str) -> Result<()> {
        let tool = {
            let mut inner = self.inner.write().await;
            let tool = inner.tools.remove(id).ok_or_else(|| {
                ToolbeltError::Registry(format!("Tool '{}' is not registered", id))
            })?;
            inner.invocations.remove(id);
            inner.last_unregistered = Some(id.to_string());
            tool
        };

        if let Err(e) = tool.cleanup().await {
            warn!(tool = %id, error = %e, "Tool cleanup hook failed");
        }
        info!(tool = %id, "Unregistered tool");
        Ok(())
    }

    /// Look up a tool by id.
    pub async fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.inner.read().await.tools.get(id).cloned()
    }

    /// Whether a tool id is registered.
    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.tools.contains_key(id)
    }

    /// Number of registered tools.
    pub async fn len(&self) -> usize {
        self.inner.read().await.tools.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.tools.is_empty()
    }

    /// Flip a tool's enabled state. Fails if the id is unknown.
    ///
    /// Metadata is otherwise immutable, so the tool entry is swapped for a
    /// wrapper carrying the updated flag.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        let mut inner = self.inner.write().await;
        let tool = inner
            .tools
            .get(id)
            .cloned()
            .ok_or_else(|| ToolbeltError::Registry(format!("Tool '{}' is not registered", id)))?;
        if tool.metadata().enabled == enabled {
            return Ok(());
        }
        let mut metadata = tool.metadata().clone();
        metadata.enabled = enabled;
        inner
            .tools
            .insert(id.to_string(), Arc::new(ToggledTool { metadata, tool }));
        info!(tool = %id, enabled, "Changed tool enabled state");
        Ok(())
    }

    /// Return metadata for every tool matching all predicates in `filter`.
    /// An empty filter returns every tool; ordering is not meaningful.
    pub async fn search(&self, filter: &ToolFilter) -> Vec<ToolMetadata> {
        self.inner
            .read()
            .await
            .tools
            .values()
            .map(|t| t.metadata().clone())
            .filter(|m| filter.matches(m))
            .collect()
    }

    /// Execute a registered, enabled tool and record the invocation.
    pub async fn execute_tool(&self, id: &str, params: Value) -> Result<Value> {
        let tool = self
            .get(id)
            .await
            .ok_or_else(|| ToolbeltError::Registry(format!("Tool '{}' is not registered", id)))?;
        if !tool.metadata().enabled {
            return Err(ToolbeltError::Registry(format!(
                "Tool '{}' is disabled",
                id
            )));
        }

        {
            let mut inner = self.inner.write().await;
            *inner.invocations.entry(id.to_string()).or_insert(0) += 1;
        }

        tool.execute(params).await
    }

    /// Recompute statistics from the live tool set. Always fresh, never
    /// cached.
    pub async fn statistics(&self) -> RegistryStatistics {
        let inner = self.inner.read().await;
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        let mut enabled = 0usize;
        for tool in inner.tools.values() {
            let meta = tool.metadata();
            *by_category.entry(meta.category.to_string()).or_insert(0) += 1;
            if meta.enabled {
                enabled += 1;
            }
        }
        RegistryStatistics {
            total_tools: inner.tools.len(),
            enabled_tools: enabled,
            disabled_tools: inner.tools.len() - enabled,
            by_category,
            invocations: inner.invocations.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            last_registered: inner.last_registered.clone(),
            last_unregistered: inner.last_unregistered.clone(),
        }
    }

    /// Remove every entry without invoking cleanup hooks. Intended for
    /// process teardown and tests, not a graceful unregister path.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        let count = inner.tools.len();
        inner.tools.clear();
        inner.invocations.clear();
        info!(removed = count, "Cleared tool registry");
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

/// Wrapper that overrides only the `enabled` flag of an existing tool.
struct ToggledTool {
    metadata: ToolMetadata,
    tool: Arc<dyn Tool>,
}

#[async_trait::async_trait]
impl Tool for ToggledTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        self.tool.execute(params).await
    }

    fn validate(&self) -> Result<()> {
        self.tool.validate()
    }

    async fn initialize(&self) -> Result<()> {
        self.tool.initialize().await
    }

    async fn cleanup(&self) -> Result<()> {
        self.tool.cleanup().await
    }
}
