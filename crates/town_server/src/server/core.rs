//! Core server implementation.
//!
//! Binds the listener, runs the accept loop and coordinates shutdown. Game
//! state never lives here; every connection is handed to
//! [`handle_connection`] which talks to towns through the registry.

use crate::config::ServerConfig;
use crate::connection::ConnectionManager;
use crate::error::ServerError;
use crate::registry::TownRegistry;
use crate::server::handlers::handle_connection;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};

/// The town server.
///
/// Accepts WebSocket connections, enforces the connection limit and routes
/// each connection into the town it asks to join.
pub struct TownServer {
    /// Server configuration settings
    config: ServerConfig,
    /// Towns reachable from this server
    registry: Arc<TownRegistry>,
    /// Live connections and their player assignments
    connection_manager: Arc<ConnectionManager>,
    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl TownServer {
    /// Creates a server over an already populated town registry.
    ///
    /// # Arguments
    ///
    /// * `config` - Network and limit settings
    /// * `registry` - Towns clients may join
    pub fn new(config: ServerConfig, registry: Arc<TownRegistry>) -> Self {
        let connection_manager = Arc::new(ConnectionManager::new(config.max_connections));
        let (shutdown_sender, _) = broadcast::channel(1);
        Self {
            config,
            registry,
            connection_manager,
            shutdown_sender,
        }
    }

    /// Binds the configured address.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Network` if the socket cannot be created, bound
    /// or put into listening mode.
    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.config.bind_address;
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::Network(format!("Socket creation failed: {e}")))?;
        socket.set_reuse_address(true).ok();
        socket
            .bind(&addr.into())
            .map_err(|e| ServerError::Network(format!("Bind to {addr} failed: {e}")))?;
        socket
            .listen(1024)
            .map_err(|e| ServerError::Network(format!("Listen failed: {e}")))?;

        let std_listener: StdTcpListener = socket.into();
        std_listener
            .set_nonblocking(true)
            .map_err(|e| ServerError::Network(format!("Failed to make listener non-blocking: {e}")))?;
        let listener = TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::Network(format!("Tokio listener creation failed: {e}")))?;
        info!("✅ Listener bound on {}", self.local_addr(&listener));
        Ok(listener)
    }

    /// Binds and serves until shutdown.
    pub async fn start(&self) -> Result<(), ServerError> {
        info!("🚀 Starting town server on {}", self.config.bind_address);
        let listener = self.bind()?;
        self.serve(listener).await
    }

    /// Runs the accept loop on an existing listener until shutdown.
    ///
    /// Towns are closed once the loop stops.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        info!(
            "🏘️ Serving {} town(s): {:?}",
            self.registry.len(),
            self.registry.town_ids()
        );
        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let connection_manager = self.connection_manager.clone();
                        let registry = self.registry.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, connection_manager, registry).await {
                                error!("Connection error from {}: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                },
                _ = shutdown_receiver.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("🧹 Performing server cleanup...");
        self.registry.shutdown();
        info!("Server stopped");
        Ok(())
    }

    /// Signals the accept loop to stop.
    pub fn shutdown(&self) {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<TownRegistry> {
        self.registry.clone()
    }

    pub fn connection_manager(&self) -> Arc<ConnectionManager> {
        self.connection_manager.clone()
    }

    fn local_addr(&self, listener: &TcpListener) -> SocketAddr {
        listener.local_addr().unwrap_or(self.config.bind_address)
    }
}
