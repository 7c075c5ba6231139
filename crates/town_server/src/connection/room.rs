//! Rooms: the set of connections sharing one town.

use super::{ConnectionId, Outbound};
use std::collections::HashMap;
use town_types::ServerMessage;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};

/// Something that can deliver server messages to the members of a room.
///
/// Game regions and the motion broadcaster only ever talk to clients through
/// this trait, so they can be driven without sockets.
pub trait RoomEmitter {
    /// Sends a message to every member of the room.
    fn emit(&self, message: &ServerMessage);

    /// Sends a message to a single member.
    fn send_to(&self, connection: ConnectionId, message: &ServerMessage);
}

/// Outbound queues of every connection in one town.
///
/// Delivery never waits. A member whose queue is full misses the frame.
#[derive(Debug, Default)]
pub struct Room {
    members: HashMap<ConnectionId, Outbound>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, connection: ConnectionId, outbound: Outbound) {
        self.members.insert(connection, outbound);
    }

    pub fn leave(&mut self, connection: ConnectionId) -> bool {
        self.members.remove(&connection).is_some()
    }

    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.members.contains_key(&connection)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    serde_json::to_string(message)
        .map_err(|e| error!("Failed to encode server message: {}", e))
        .ok()
}

fn deliver(connection: ConnectionId, outbound: &Outbound, text: String) {
    match outbound.try_send(text) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!("🐢 Connection {} is not keeping up, dropped a frame", connection);
        }
        Err(TrySendError::Closed(_)) => {
            debug!("Connection {} is closing, dropped a frame", connection);
        }
    }
}

impl RoomEmitter for Room {
    fn emit(&self, message: &ServerMessage) {
        let Some(text) = encode(message) else {
            return;
        };
        for (connection, outbound) in &self.members {
            deliver(*connection, outbound, text.clone());
        }
    }

    fn send_to(&self, connection: ConnectionId, message: &ServerMessage) {
        let Some(outbound) = self.members.get(&connection) else {
            debug!("Connection {} is not in this room", connection);
            return;
        };
        if let Some(text) = encode(message) {
            deliver(connection, outbound, text);
        }
    }
}
