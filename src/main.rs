use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use toolbelt::api::{self, ApiState};
use toolbelt::plugins::{ManifestPluginSource, PluginManager};
use toolbelt::registry::{ToolFilter, ToolRegistry};
use toolbelt::Config;

#[derive(Parser)]
#[command(name = "toolbelt")]
#[command(about = "Plugin-driven developer toolbox", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the management API server
    Serve,
    /// Inspect and manage plugins
    Plugins {
        #[command(subcommand)]
        action: PluginAction,
    },
    /// Inspect registered tools
    Tools {
        #[command(subcommand)]
        action: ToolAction,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum PluginAction {
    /// List discovered plugins and their state
    List,
    /// Load a plugin from a directory
    Load {
        /// Path to the plugin directory
        path: String,
        /// Replace an already-loaded plugin with the same id
        #[arg(short, long)]
        force: bool,
    },
    /// Unload a plugin by id
    Unload {
        id: String,
        /// Also unload plugins that depend on this one
        #[arg(short, long)]
        cascade: bool,
    },
    /// Reload one plugin, or all plugins when no id is given
    Reload {
        id: Option<String>,
    },
}

#[derive(Subcommand)]
enum ToolAction {
    /// List registered tools
    List,
    /// Search tools by a name/description substring
    Search { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Some(Commands::Version) | None => {
            println!("toolbelt {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Serve) => serve(config).await,
        Some(Commands::Plugins { action }) => plugins(config, action).await,
        Some(Commands::Tools { action }) => tools(config, action).await,
    }
}

fn build_manager(config: &Config) -> Arc<PluginManager> {
    let registry = Arc::new(ToolRegistry::new(config.registry.clone()));
    Arc::new(PluginManager::new(
        Arc::new(ManifestPluginSource),
        registry,
        config.plugins.clone(),
        Config::data_dir(),
    ))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let manager = build_manager(&config);

    if config.plugins.enabled {
        match manager.load_discovered().await {
            Ok(loaded) => {
                println!("Loaded {} plugin(s)", loaded.len());
            }
            Err(e) => {
                eprintln!("Plugin startup aborted: {}", e);
            }
        }
    }

    let state = ApiState::new(manager, &config.server);
    api::serve(state, &config.server).await?;
    Ok(())
}

async fn plugins(config: Config, action: PluginAction) -> anyhow::Result<()> {
    let manager = build_manager(&config);

    match action {
        PluginAction::List => {
            manager.load_discovered().await?;
            let listed = manager.list();
            if listed.is_empty() {
                println!("No plugins found");
            }
            for plugin in listed {
                let state = if plugin.loaded { "active" } else { "failed" };
                println!(
                    "{} {} [{}] commands: {}",
                    plugin.id,
                    plugin.version,
                    state,
                    plugin.commands.join(", ")
                );
            }
        }
        PluginAction::Load { path, force } => {
            let info = manager.load(&path, force).await?;
            println!("Loaded {} {}", info.id, info.version);
        }
        PluginAction::Unload { id, cascade } => {
            manager.load_discovered().await?;
            manager.unload(&id, cascade).await?;
            println!("Unloaded {}", id);
        }
        PluginAction::Reload { id } => {
            manager.load_discovered().await?;
            let infos = manager.reload(id.as_deref()).await?;
            println!("Reloaded {} plugin(s)", infos.len());
        }
    }
    Ok(())
}

async fn tools(config: Config, action: ToolAction) -> anyhow::Result<()> {
    let manager = build_manager(&config);
    manager.load_discovered().await?;
    let registry = manager.registry();

    let filter = match action {
        ToolAction::List => ToolFilter::default(),
        ToolAction::Search { query } => ToolFilter {
            query: Some(query),
            ..Default::default()
        },
    };

    let found = registry.search(&filter).await;
    if found.is_empty() {
        println!("No tools found");
    }
    for tool in found {
        println!("{} [{}] {}", tool.id, tool.category, tool.description);
    }
    Ok(())
}
