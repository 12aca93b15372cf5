//! Plugin lifecycle manager for Toolbelt
//!
//! The manager owns the set of loaded plugins and is the only component that
//! mutates plugin state. It drives each plugin through the lifecycle state
//! machine (discovered, validating, resolved, initializing, active, failed,
//! unloading, unloaded), resolves load order from declared dependencies, and
//! aggregates the commands active plugins contribute.
//!
//! # Concurrency
//!
//! Mutating operations (`load`, `unload`, `reload`) are serialized behind one
//! async mutex, so at most one is ever in flight. Read operations (`list`,
//! `list_commands`) never touch that mutex: they read a snapshot that is
//! republished atomically after every completed transition, so readers always
//! observe a consistent plugin set, never one mid-transition.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{Result, ToolbeltError};
use crate::registry::ToolRegistry;

use super::graph::DependencyGraph;
use super::types::{
    validate_metadata, CommandSpec, Plugin, PluginConfig, PluginContext, PluginInfo,
    PluginMetadata, PluginSource, PluginState,
};

/// A tracked plugin: metadata plus runtime state. Owned exclusively by the
/// manager and never handed out.
struct PluginInstance {
    metadata: PluginMetadata,
    state: PluginState,
    commands: Vec<CommandSpec>,
    plugin: Arc<dyn Plugin>,
    /// The external reference this plugin was resolved from, kept for reload.
    reference: String,
    /// Cause recorded when the plugin reached the failed state.
    error: Option<String>,
}

impl PluginInstance {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: self.metadata.id.clone(),
            name: self.metadata.name.clone(),
            version: self.metadata.version.clone(),
            loaded: self.state == PluginState::Active,
            dependencies: self.metadata.dependencies.clone(),
            commands: self.commands.iter().map(|c| c.name.clone()).collect(),
            error: self.error.clone(),
        }
    }
}

#[derive(Default)]
struct ManagerInner {
    instances: HashMap<String, PluginInstance>,
    graph: DependencyGraph,
}

/// Consistent read-side view, republished after every completed transition.
#[derive(Default, Clone)]
struct Snapshot {
    plugins: Vec<PluginInfo>,
    commands: Vec<CommandSpec>,
}

/// Owns all loaded plugins and drives their lifecycle.
pub struct PluginManager {
    source: Arc<dyn PluginSource>,
    registry: Arc<ToolRegistry>,
    config: PluginConfig,
    data_dir: PathBuf,
    inner: Mutex<ManagerInner>,
    snapshot: RwLock<Snapshot>,
}

impl PluginManager {
    pub fn new(
        source: Arc<dyn PluginSource>,
        registry: Arc<ToolRegistry>,
        config: PluginConfig,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            source,
            registry,
            config,
            data_dir,
            inner: Mutex::new(ManagerInner::default()),
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// The shared tool registry plugins register into.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Load a plugin from an external reference.
    ///
    /// Fails with `PluginAlreadyLoaded` if the id is already active and
    /// `force` is not set; with `force` the existing instance is unloaded
    /// first. Validation, dependency, and initialization failures are
    /// returned as `PluginLoadFailed` carrying the underlying cause; an
    /// initialization failure additionally leaves the plugin tracked in the
    /// failed state for inspection.
    pub async fn load(&self, reference: &str, force: bool) -> Result<PluginInfo> {
        let mut inner = self.inner.lock().await;
        // Publish even on failure: a plugin that reached the failed state
        // must be visible to readers immediately.
        let result = self.load_locked(&mut inner, reference, force).await;
        self.publish(&inner);
        result
    }

    /// Unload a plugin by id.
    ///
    /// Fails with `PluginNotFound` if the id is not tracked and with
    /// `PluginUnloadFailed` if active dependents exist and `cascade` was not
    /// requested. With `cascade`, dependents are unloaded first, leaves
    /// before the plugins they depend on. The cleanup hook is always
    /// attempted; its failure is logged, never escalated.
    pub async fn unload(&self, id: &str, cascade: bool) -> Result<()> {
        let mut inner = self.inner.lock().await;

        if !inner.instances.contains_key(id) {
            return Err(ToolbeltError::PluginNotFound(id.to_string()));
        }

        let blockers = active_dependents(&inner, id);
        if !blockers.is_empty() {
            if !cascade {
                return Err(ToolbeltError::unload_failed(
                    id,
                    format!("active dependents exist: {}", blockers.join(", ")),
                ));
            }
            for dependent in inner.graph.transitive_dependents(id) {
                if inner.instances.contains_key(&dependent) {
                    self.unload_locked(&mut inner, &dependent).await;
                    self.publish(&inner);
                }
            }
        }

        self.unload_locked(&mut inner, id).await;
        self.publish(&inner);
        Ok(())
    }

    /// Reload one plugin (unload + load preserving its original reference),
    /// or — when `id` is `None` — every active plugin in dependency order:
    /// leaves are unloaded first, roots loaded last, so no plugin is briefly
    /// active without its dependencies satisfied.
    ///
    /// The bulk form runs as one serialized batch. A cycle fails the batch
    /// before anything transitions; a failure mid-batch aborts the remainder
    /// and leaves already-transitioned plugins in their last reached state.
    ///
    /// The single form does not require unloading dependents first: the
    /// plugin is expected back immediately, so dependents stay active across
    /// the swap. If the re-load fails, dependents keep running with the
    /// dependency in the failed state — same no-rollback policy as the
    /// batch, with the cause visible through `list()`.
    pub async fn reload(&self, id: Option<&str>) -> Result<Vec<PluginInfo>> {
        let mut inner = self.inner.lock().await;

        match id {
            Some(id) => {
                let reference = inner
                    .instances
                    .get(id)
                    .map(|i| i.reference.clone())
                    .ok_or_else(|| ToolbeltError::PluginNotFound(id.to_string()))?;

                self.unload_locked(&mut inner, id).await;
                self.publish(&inner);
                let result = self.load_locked(&mut inner, &reference, false).await;
                self.publish(&inner);
                Ok(vec![result?])
            }
            None => {
                // Order the whole graph up front; a cycle fails the batch
                // before any plugin transitions.
                let unload_order: Vec<String> = inner
                    .graph
                    .unload_order()?
                    .into_iter()
                    .filter(|id| {
                        inner
                            .instances
                            .get(id)
                            .map(|i| i.state == PluginState::Active)
                            .unwrap_or(false)
                    })
                    .collect();

                let mut references: Vec<(String, String)> = Vec::new();
                for id in &unload_order {
                    let reference = inner.instances[id].reference.clone();
                    references.push((id.clone(), reference));
                    self.unload_locked(&mut inner, id).await;
                    self.publish(&inner);
                }

                // Roots were unloaded last, so loading in reverse restores
                // dependencies before their dependents.
                let mut reloaded = Vec::with_capacity(references.len());
                for (id, reference) in references.iter().rev() {
                    match self.load_locked(&mut inner, reference, false).await {
                        Ok(info) => {
                            self.publish(&inner);
                            reloaded.push(info);
                        }
                        Err(e) => {
                            self.publish(&inner);
                            warn!(plugin = %id, error = %e, "Reload batch aborted");
                            return Err(e);
                        }
                    }
                }
                Ok(reloaded)
            }
        }
    }

    /// Public info for every tracked plugin (active and failed). Reads the
    /// snapshot; never blocks on an in-flight mutation.
    pub fn list(&self) -> Vec<PluginInfo> {
        self.snapshot
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .plugins
            .clone()
    }

    /// The deduplicated aggregate of commands from active plugins.
    pub fn list_commands(&self) -> Vec<CommandSpec> {
        self.snapshot
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .commands
            .clone()
    }

    /// Discover plugins from the configured directories and load them in
    /// dependency order. Returns the info of every plugin that became
    /// active; aborts on a cycle or a load failure, leaving earlier plugins
    /// loaded.
    pub async fn load_discovered(&self) -> Result<Vec<PluginInfo>> {
        let paths = super::loader::discover_plugin_paths(&self.config)?;
        let references: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        self.load_batch(&references).await
    }

    /// Load a batch of references in dependency order.
    pub async fn load_batch(&self, references: &[String]) -> Result<Vec<PluginInfo>> {
        let mut inner = self.inner.lock().await;

        // Resolve everything first so the batch can be ordered before any
        // lifecycle transition happens.
        let mut resolved: HashMap<String, (String, Box<dyn Plugin>)> = HashMap::new();
        let mut graph = DependencyGraph::new();
        for reference in references {
            let plugin = self.resolve(reference).await?;
            let metadata = plugin.metadata().clone();
            validate_metadata(&metadata)
                .map_err(|e| ToolbeltError::load_failed(&metadata.id, e))?;
            graph.insert(&metadata.id, &metadata.dependencies);
            resolved.insert(metadata.id.clone(), (reference.clone(), plugin));
        }

        let order = graph.load_order()?;

        let mut loaded = Vec::new();
        for id in order {
            let Some((reference, plugin)) = resolved.remove(&id) else {
                continue;
            };
            let result = self
                .load_resolved(&mut inner, plugin, &reference, false)
                .await;
            self.publish(&inner);
            loaded.push(result?);
        }
        Ok(loaded)
    }

    // ---- internals (caller holds the inner lock) ----

    async fn load_locked(
        &self,
        inner: &mut ManagerInner,
        reference: &str,
        force: bool,
    ) -> Result<PluginInfo> {
        // discovered -> validating
        let plugin = self.resolve(reference).await?;
        self.load_resolved(inner, plugin, reference, force).await
    }

    async fn load_resolved(
        &self,
        inner: &mut ManagerInner,
        plugin: Box<dyn Plugin>,
        reference: &str,
        force: bool,
    ) -> Result<PluginInfo> {
        let metadata = plugin.metadata().clone();

        // validating -> (rejected | resolved)
        validate_metadata(&metadata).map_err(|e| ToolbeltError::load_failed(&metadata.id, e))?;

        if let Some(existing) = inner.instances.get(&metadata.id) {
            if existing.state == PluginState::Active {
                if !force {
                    return Err(ToolbeltError::PluginAlreadyLoaded(metadata.id.clone()));
                }
                // Forced replace: implicit unload, then fall through to load.
                self.unload_locked(inner, &metadata.id).await;
            } else {
                // A rejected/failed remnant never blocks a fresh attempt.
                inner.instances.remove(&metadata.id);
                inner.graph.remove(&metadata.id);
            }
        }

        // resolved: dependency ids checked against the live set.
        for dep in &metadata.dependencies {
            let satisfied = inner
                .instances
                .get(dep)
                .map(|i| i.state == PluginState::Active)
                .unwrap_or(false);
            if !satisfied {
                return Err(ToolbeltError::load_failed(
                    &metadata.id,
                    format!("dependency '{}' is not loaded and active", dep),
                ));
            }
        }

        // initializing -> (failed | active)
        let plugin: Arc<dyn Plugin> = Arc::from(plugin);
        let ctx = PluginContext::new(
            metadata.id.clone(),
            self.data_dir.join("plugins").join(&metadata.id),
            self.registry.clone(),
            self.config
                .settings
                .get(&metadata.id)
                .cloned()
                .unwrap_or(Value::Null),
        );

        if let Err(e) = self.run_hook(plugin.initialize(&ctx)).await {
            let cause = e.to_string();
            warn!(plugin = %metadata.id, error = %cause, "Plugin initialization failed");
            inner.graph.insert(&metadata.id, &metadata.dependencies);
            inner.instances.insert(
                metadata.id.clone(),
                PluginInstance {
                    metadata: metadata.clone(),
                    state: PluginState::Failed,
                    commands: Vec::new(),
                    plugin,
                    reference: reference.to_string(),
                    error: Some(cause.clone()),
                },
            );
            return Err(ToolbeltError::load_failed(&metadata.id, cause));
        }

        let commands = plugin.commands();
        info!(
            plugin = %metadata.id,
            version = %metadata.version,
            commands = commands.len(),
            "Loaded plugin"
        );

        inner.graph.insert(&metadata.id, &metadata.dependencies);
        let instance = PluginInstance {
            metadata: metadata.clone(),
            state: PluginState::Active,
            commands,
            plugin,
            reference: reference.to_string(),
            error: None,
        };
        let info = instance.info();
        inner.instances.insert(metadata.id.clone(), instance);
        Ok(info)
    }

    /// active -> unloading -> unloaded. Cleanup failure is logged only.
    async fn unload_locked(&self, inner: &mut ManagerInner, id: &str) {
        let Some(mut instance) = inner.instances.remove(id) else {
            return;
        };
        instance.state = PluginState::Unloading;

        if let Err(e) = self.run_hook(instance.plugin.cleanup()).await {
            warn!(plugin = %id, error = %e, "Plugin cleanup hook failed");
        }

        inner.graph.remove(id);
        info!(plugin = %id, "Unloaded plugin");
    }

    async fn resolve(&self, reference: &str) -> Result<Box<dyn Plugin>> {
        self.source.resolve(reference).await.map_err(|e| match e {
            e @ ToolbeltError::PluginLoadFailed { .. } => e,
            other => ToolbeltError::load_failed(reference, other),
        })
    }

    /// Await a lifecycle hook to completion, bounded by the configured
    /// timeout so one misbehaving plugin cannot stall the manager.
    async fn run_hook<F>(&self, hook: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        if self.config.hook_timeout_secs == 0 {
            return hook.await;
        }
        let budget = Duration::from_secs(self.config.hook_timeout_secs);
        match tokio::time::timeout(budget, hook).await {
            Ok(result) => result,
            Err(_) => Err(ToolbeltError::Server(format!(
                "lifecycle hook timed out after {}s",
                budget.as_secs()
            ))),
        }
    }

    /// Republish the read-side snapshot from the current instance map.
    fn publish(&self, inner: &ManagerInner) {
        let mut plugins: Vec<PluginInfo> =
            inner.instances.values().map(|i| i.info()).collect();
        plugins.sort_by(|a, b| a.id.cmp(&b.id));

        let mut seen = HashSet::new();
        let mut commands = Vec::new();
        for instance in inner.instances.values() {
            if instance.state != PluginState::Active {
                continue;
            }
            for command in &instance.commands {
                if seen.insert(command.name.clone()) {
                    commands.push(command.clone());
                }
            }
        }
        commands.sort_by(|a, b| a.name.cmp(&b.name));

        let mut snapshot = self.snapshot.write().unwrap_or_else(|p| p.into_inner());
        *snapshot = Snapshot { plugins, commands };
    }
}

/// Ids of active plugins that declare a dependency on `id`.
fn active_dependents(inner: &ManagerInner, id: &str) -> Vec<String> {
    let mut dependents: Vec<String> = inner
        .instances
        .values()
        .filter(|i| i.state == PluginState::Active && i.metadata.dependencies.iter().any(|d| d == id))
        .map(|i| i.metadata.id.clone())
        .collect();
    dependents.sort();
    dependents
}
