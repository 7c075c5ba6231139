//! Connection management for client connections.
//!
//! This module tracks live WebSocket connections, hands each one a
//! [`ConnectionHandle`] for typed listener registration, and groups the
//! outbound side of connections into rooms.

pub mod client;
pub mod handle;
pub mod manager;
pub mod room;

pub use client::ClientConnection;
pub use handle::{
    CommandListener, ConnectionHandle, DisconnectListener, MoveListener, Subscription,
};
pub use manager::ConnectionManager;
pub use room::{Room, RoomEmitter};

/// Type alias for connection identifiers.
///
/// Connection IDs are used to uniquely identify client connections
/// throughout their lifecycle on the server.
pub type ConnectionId = usize;

/// Frames a connection may have queued before further frames to it are dropped.
pub const OUTBOUND_CAPACITY: usize = 100;

/// Sending half of a connection's outbound queue. Carries encoded JSON frames
/// to the task that owns the socket sink.
pub type Outbound = tokio::sync::mpsc::Sender<String>;
