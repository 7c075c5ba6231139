//! Live connection table.

use super::{ClientConnection, ConnectionId};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use town_types::PlayerId;

/// Tracks every accepted connection and enforces the connection limit.
///
/// Shared between accept loops through an `Arc`. Towns never touch it; they
/// only see the outbound queues handed to them at join time.
#[derive(Debug)]
pub struct ConnectionManager {
    connections: DashMap<ConnectionId, ClientConnection>,
    next_id: AtomicUsize,
    /// Admitted connections. Reserved before insertion so concurrent accepts
    /// cannot overshoot the limit.
    active: AtomicUsize,
    max_connections: usize,
}

impl ConnectionManager {
    pub fn new(max_connections: usize) -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicUsize::new(1),
            active: AtomicUsize::new(0),
            max_connections,
        }
    }

    /// Registers a new connection unless the server is full.
    ///
    /// # Returns
    ///
    /// The new connection's id, or `None` when `max_connections` is reached.
    pub fn try_add_connection(&self, remote_addr: SocketAddr) -> Option<ConnectionId> {
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                (active < self.max_connections).then_some(active + 1)
            })
            .ok()?;
        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections
            .insert(connection_id, ClientConnection::new(remote_addr));
        Some(connection_id)
    }

    /// Forgets a connection and frees its slot.
    ///
    /// # Returns
    ///
    /// The connection's bookkeeping, including the player and town it joined.
    pub fn remove_connection(&self, connection_id: ConnectionId) -> Option<ClientConnection> {
        let (_, connection) = self.connections.remove(&connection_id)?;
        self.active.fetch_sub(1, Ordering::AcqRel);
        Some(connection)
    }

    /// Records which town player a connection became.
    pub fn assign_player(&self, connection_id: ConnectionId, player_id: PlayerId, town_id: &str) {
        if let Some(mut connection) = self.connections.get_mut(&connection_id) {
            connection.player_id = Some(player_id);
            connection.town_id = Some(town_id.to_string());
        }
    }

    pub fn connection_count(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}
