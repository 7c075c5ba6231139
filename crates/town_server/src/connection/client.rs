//! Client connection representation.

use std::net::SocketAddr;
use std::time::SystemTime;
use town_types::PlayerId;

/// Bookkeeping for one accepted socket.
///
/// # Fields
///
/// * `player_id` - Town identity, assigned once the client joins a town
/// * `town_id` - Town the client joined
/// * `remote_addr` - The network address of the connected client
/// * `connected_at` - Timestamp when the connection was established
#[derive(Debug)]
pub struct ClientConnection {
    pub player_id: Option<PlayerId>,
    pub town_id: Option<String>,
    pub remote_addr: SocketAddr,
    pub connected_at: SystemTime,
}

impl ClientConnection {
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            player_id: None,
            town_id: None,
            remote_addr,
            connected_at: SystemTime::now(),
        }
    }
}
