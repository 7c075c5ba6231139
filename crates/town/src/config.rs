//! Configuration management for the town server.
//!
//! Loads the TOML configuration file, applies command-line overrides,
//! validates the result and converts it into the types the server expects.

use crate::cli::CliArgs;
use anyhow::Context;
use game_session::GameSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use town_server::ServerConfig;
use town_types::Ingredient;
use tracing::info;

fn default_max_connections() -> usize {
    1000
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_round_seconds() -> u32 {
    120
}

fn default_recipe_length() -> usize {
    3
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network settings
    pub server: ServerSettings,
    /// Kitchen game settings
    #[serde(default)]
    pub game: GameSection,
    /// Towns to open at startup
    #[serde(default)]
    pub towns: Vec<TownSettings>,
    /// Logging settings
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to listen on (e.g. "127.0.0.1:8081")
    pub listen_addr: String,
    /// Maximum number of concurrent client connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Game clock resolution in milliseconds (0 disables game clocks)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSection {
    /// Seconds on the clock when a round starts
    #[serde(default = "default_round_seconds")]
    pub round_seconds: u32,
    /// Ingredients per recipe
    #[serde(default = "default_recipe_length")]
    pub recipe_length: usize,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            round_seconds: default_round_seconds(),
            recipe_length: default_recipe_length(),
        }
    }
}

/// One town served by this process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TownSettings {
    pub id: String,
    pub friendly_name: String,
    /// Path to the town's map description
    pub map: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                listen_addr: "127.0.0.1:8081".to_string(),
                max_connections: default_max_connections(),
                tick_interval_ms: default_tick_interval(),
            },
            game: GameSection::default(),
            towns: vec![TownSettings {
                id: "undercooked".to_string(),
                friendly_name: "Undercooked Town".to_string(),
                map: PathBuf::from("maps/undercooked.json"),
            }],
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to `path`
    /// and returns it.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Applies command-line overrides.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(listen) = args.listen {
            self.server.listen_addr = listen.to_string();
        }
        if let Some(map) = &args.map {
            for town in self.towns.iter_mut() {
                town.map = map.clone();
            }
        }
        if let Some(round_seconds) = args.round_seconds {
            self.game.round_seconds = round_seconds;
        }
        if args.debug {
            self.logging.level = "debug".to_string();
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(format!("Invalid listen address: {}", self.server.listen_addr));
        }

        let vocabulary = Ingredient::ALL.len();
        if self.game.recipe_length == 0 || self.game.recipe_length > vocabulary {
            return Err(format!(
                "recipe_length must be between 1 and {vocabulary}, got {}",
                self.game.recipe_length
            ));
        }

        if self.towns.is_empty() {
            return Err("At least one town must be configured".to_string());
        }
        let mut seen = HashSet::new();
        for town in &self.towns {
            if town.id.is_empty() {
                return Err("Town id cannot be empty".to_string());
            }
            if !seen.insert(town.id.as_str()) {
                return Err(format!("Duplicate town id: {}", town.id));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                self.logging.level
            ));
        }
        Ok(())
    }

    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            round_seconds: self.game.round_seconds,
            recipe_length: self.game.recipe_length,
        }
    }

    /// Converts the application configuration to a server configuration.
    pub fn to_server_config(&self) -> anyhow::Result<ServerConfig> {
        Ok(ServerConfig {
            bind_address: self
                .server
                .listen_addr
                .parse()
                .with_context(|| format!("Invalid listen address: {}", self.server.listen_addr))?,
            max_connections: self.server.max_connections,
            tick_interval_ms: self.server.tick_interval_ms,
            game: self.game_settings(),
        })
    }
}
