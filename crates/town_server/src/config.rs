//! Server configuration.

use game_session::GameSettings;
use std::net::SocketAddr;

/// Runtime settings for a [`TownServer`](crate::TownServer) and its towns.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to
    pub bind_address: SocketAddr,
    /// Connections beyond this are dropped before the handshake
    pub max_connections: usize,
    /// How often each town advances its game clocks, in milliseconds
    pub tick_interval_ms: u64,
    /// Settings handed to every kitchen game
    pub game: GameSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8081)),
            max_connections: 1000,
            tick_interval_ms: 1000,
            game: GameSettings::default(),
        }
    }
}
