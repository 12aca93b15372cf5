//! Toolbelt - Plugin-driven developer toolbox

pub mod api;
pub mod config;
pub mod error;
pub mod plugins;
pub mod registry;

pub use config::Config;
pub use error::{Result, ToolbeltError};
