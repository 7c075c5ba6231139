//! Per-connection protocol handling.
//!
//! Each accepted socket gets one reader loop (this module) and one writer
//! task. The reader decodes client frames and forwards them to the joined
//! town in arrival order. The writer drains the connection's outbound queue,
//! which the town fills with already encoded frames.

use crate::connection::{ConnectionId, ConnectionManager, Outbound, OUTBOUND_CAPACITY};
use crate::error::ServerError;
use crate::registry::{TownHandle, TownRegistry};
use crate::town::TownEvent;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use town_types::{ClientMessage, ServerMessage};
use tracing::{debug, error, info, warn};

/// Serves one client socket from handshake to close.
///
/// The connection limit is checked before the WebSocket handshake; a full
/// server drops the socket without answering.
///
/// # Arguments
///
/// * `stream` - Accepted TCP stream
/// * `addr` - Remote address, for logging
/// * `connection_manager` - Live connection table
/// * `registry` - Towns the client may join
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connection_manager: Arc<ConnectionManager>,
    registry: Arc<TownRegistry>,
) -> Result<(), ServerError> {
    let Some(connection_id) = connection_manager.try_add_connection(addr) else {
        warn!("🚫 Refusing connection from {}: server is full", addr);
        return Ok(());
    };

    let result = serve_connection(stream, addr, connection_id, &connection_manager, &registry).await;

    if let Some(connection) = connection_manager.remove_connection(connection_id) {
        let lifetime = connection.connected_at.elapsed().unwrap_or_default();
        match (connection.player_id, connection.town_id) {
            (Some(player), Some(town)) => info!(
                "🔌 Connection {} from {} closed after {:.1?} (player {} in town {})",
                connection_id, connection.remote_addr, lifetime, player, town
            ),
            _ => info!(
                "🔌 Connection {} from {} closed after {:.1?} without joining a town",
                connection_id, connection.remote_addr, lifetime
            ),
        }
    }
    result
}

async fn serve_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connection_id: ConnectionId,
    connection_manager: &ConnectionManager,
    registry: &TownRegistry,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake with {addr} failed: {e}")))?;
    info!("🔗 Connection {} established from {}", connection_id, addr);

    let (mut ws_sink, mut ws_receiver) = ws_stream.split();
    let (outbound, mut outbound_queue) = mpsc::channel::<String>(OUTBOUND_CAPACITY);

    tokio::spawn(async move {
        while let Some(text) = outbound_queue.recv().await {
            if let Err(e) = ws_sink.send(Message::text(text)).await {
                debug!("Writer for connection {} stopped: {}", connection_id, e);
                return;
            }
        }
        let _ = ws_sink.close().await;
    });

    let mut session = Session {
        connection_id,
        outbound,
        town: None,
    };

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                session
                    .handle_text(text.as_str(), registry, connection_manager)
                    .await;
            }
            Ok(Message::Close(_)) => {
                info!("Connection {} requested close", connection_id);
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(_) => warn!("Received unsupported frame type from {}", connection_id),
            Err(e) => {
                error!("WebSocket error for connection {}: {}", connection_id, e);
                break;
            }
        }
    }

    session.close();
    Ok(())
}

/// Reader-side state of one connection.
struct Session {
    connection_id: ConnectionId,
    outbound: Outbound,
    town: Option<TownHandle>,
}

impl Session {
    async fn handle_text(
        &mut self,
        text: &str,
        registry: &TownRegistry,
        connection_manager: &ConnectionManager,
    ) {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                debug!("Unparsable frame from {}: {}", self.connection_id, e);
                self.reject(format!("Invalid message: {e}"));
                return;
            }
        };

        match self.town.clone() {
            None => self.join_town(message, registry, connection_manager).await,
            Some(town) => self.forward(message, &town),
        }
    }

    async fn join_town(
        &mut self,
        message: ClientMessage,
        registry: &TownRegistry,
        connection_manager: &ConnectionManager,
    ) {
        let ClientMessage::JoinTown { town_id, user_name } = message else {
            self.reject("Join a town first".to_string());
            return;
        };
        let Some(town) = registry.get(&town_id) else {
            self.reject(format!("No such town {town_id}"));
            return;
        };
        match town
            .join(self.connection_id, user_name, self.outbound.clone())
            .await
        {
            Ok(player_id) => {
                connection_manager.assign_player(self.connection_id, player_id, town.id());
                self.town = Some(town);
            }
            Err(e) => self.reject(e.to_string()),
        }
    }

    fn forward(&self, message: ClientMessage, town: &TownHandle) {
        let connection = self.connection_id;
        let event = match message {
            ClientMessage::JoinTown { .. } => {
                self.reject("Already joined a town".to_string());
                return;
            }
            ClientMessage::PlayerMovement { location } => TownEvent::Movement {
                connection,
                location,
            },
            ClientMessage::GameMovement { location } => TownEvent::GameMovement {
                connection,
                location,
            },
            ClientMessage::Command(envelope) => TownEvent::Command {
                connection,
                envelope,
            },
        };
        if let Err(e) = town.send(event) {
            self.reject(e.to_string());
        }
    }

    /// Answers a frame that could not be attributed to any command.
    fn reject(&self, message: String) {
        match serde_json::to_string(&ServerMessage::Error { message }) {
            Ok(text) => {
                if self.outbound.try_send(text).is_err() {
                    debug!("Dropped error frame for connection {}", self.connection_id);
                }
            }
            Err(e) => error!("Failed to encode error frame: {}", e),
        }
    }

    /// Tells the joined town this connection is gone.
    fn close(self) {
        if let Some(town) = self.town {
            if town
                .send(TownEvent::Disconnected {
                    connection: self.connection_id,
                })
                .is_err()
            {
                debug!("Town {} already closed", town.id());
            }
        }
    }
}
