//! Error types for Toolbelt
//!
//! This module defines all error types used throughout the Toolbelt runtime.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations. Every variant that crosses the management
//! API maps to a stable machine-readable code via [`ToolbeltError::code`].

use thiserror::Error;

/// The primary error type for Toolbelt operations.
#[derive(Error, Debug)]
pub enum ToolbeltError {
    /// Configuration-related errors (invalid config, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested plugin id is not tracked by the manager.
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    /// A plugin with this id is already active and `force` was not set.
    #[error("Plugin already loaded: {0}")]
    PluginAlreadyLoaded(String),

    /// Validation, dependency resolution, or initialization failed during load.
    #[error("Failed to load plugin '{id}': {cause}")]
    PluginLoadFailed {
        /// Plugin id (or the reference, when metadata was never read).
        id: String,
        /// Human-readable underlying cause.
        cause: String,
    },

    /// Unload was blocked, typically because active dependents exist.
    #[error("Failed to unload plugin '{id}': {cause}")]
    PluginUnloadFailed {
        /// Plugin id that could not be unloaded.
        id: String,
        /// Human-readable underlying cause.
        cause: String,
    },

    /// The declared dependency graph contains a cycle. Carries the cycle path.
    #[error("Dependency cycle detected: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// Tool registry errors (duplicate id, capacity exceeded, unknown tool, etc.)
    #[error("Registry error: {0}")]
    Registry(String),

    /// Malformed management-API request body.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication or authorization failures.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request rejected by the rate limiter before reaching the manager.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything genuinely unclassified. The API layer widens to this only
    /// as a last resort.
    #[error("Server error: {0}")]
    Server(String),
}

impl ToolbeltError {
    /// Stable machine-readable code for this error, as exposed on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            ToolbeltError::Config(_) => "CONFIG_ERROR",
            ToolbeltError::PluginNotFound(_) => "PLUGIN_NOT_FOUND",
            ToolbeltError::PluginAlreadyLoaded(_) => "PLUGIN_ALREADY_LOADED",
            ToolbeltError::PluginLoadFailed { .. } => "PLUGIN_LOAD_FAILED",
            ToolbeltError::PluginUnloadFailed { .. } => "PLUGIN_UNLOAD_FAILED",
            ToolbeltError::DependencyCycle(_) => "DEPENDENCY_CYCLE",
            ToolbeltError::Registry(_) => "REGISTRY_ERROR",
            ToolbeltError::InvalidRequest(_) => "INVALID_REQUEST",
            ToolbeltError::Unauthorized(_) => "UNAUTHORIZED",
            ToolbeltError::RateLimited(_) => "RATE_LIMITED",
            ToolbeltError::Io(_) | ToolbeltError::Json(_) | ToolbeltError::Server(_) => {
                "SERVER_ERROR"
            }
        }
    }

    /// Shorthand for a load failure wrapping an underlying cause.
    pub fn load_failed(id: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        ToolbeltError::PluginLoadFailed {
            id: id.into(),
            cause: cause.to_string(),
        }
    }

    /// Shorthand for an unload failure wrapping an underlying cause.
    pub fn unload_failed(id: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        ToolbeltError::PluginUnloadFailed {
            id: id.into(),
            cause: cause.to_string(),
        }
    }
}

/// A specialized `Result` type for Toolbelt operations.
pub type Result<T> = std::result::Result<T, ToolbeltError>;
