//! Town server entry point.
//!
//! Loads configuration, opens every configured town from its map and serves
//! WebSocket clients until SIGINT/SIGTERM.

mod cli;
mod config;
mod logging;
mod signals;

use anyhow::Context;
use clap::Parser;
use cli::CliArgs;
use config::AppConfig;
use game_session::{MapDescription, RandomRecipes, RecipeGame};
use std::sync::Arc;
use std::time::Duration;
use town_server::{Town, TownRegistry, TownServer};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let mut config = AppConfig::load_from_file(&args.config).await?;
    config.apply_cli(&args);
    logging::setup_logging(&config.logging);

    if let Err(e) = config.validate() {
        error!("❌ Configuration validation failed: {}", e);
        anyhow::bail!("invalid configuration in {}: {e}", args.config.display());
    }
    info!("✅ Configuration loaded from {}", args.config.display());

    let server_config = config.to_server_config()?;
    let registry = Arc::new(TownRegistry::new(Duration::from_millis(
        server_config.tick_interval_ms,
    )));
    let rules = RecipeGame::new(Arc::new(RandomRecipes), server_config.game);

    for town in &config.towns {
        let map = MapDescription::load(&town.map).with_context(|| {
            format!("Failed to load map {} for town {}", town.map.display(), town.id)
        })?;
        info!(
            "🗺️ Town {} map: {} game region(s)",
            town.id,
            map.regions.len()
        );
        registry.open_town(Town::new(
            town.id.as_str(),
            town.friendly_name.as_str(),
            &map,
            rules.clone(),
        ))?;
    }

    let server = Arc::new(TownServer::new(server_config, registry));
    let listener = server.bind()?;
    let serving = {
        let server = server.clone();
        tokio::spawn(async move { server.serve(listener).await })
    };

    info!("🎮 Town server ready. Press Ctrl+C to stop");
    let stop = signals::wait_for_shutdown().await?;
    info!("🛑 Received {} signal, closing {} towns", stop, server.registry().len());
    server.shutdown();
    serving.await??;

    info!("👋 Town server stopped");
    Ok(())
}
