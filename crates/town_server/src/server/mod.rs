//! WebSocket server that fronts the towns.
//!
//! [`TownServer`] owns the listener and the connection limit; the per-socket
//! protocol lives in [`handlers`].

pub mod core;
pub mod handlers;

pub use self::core::TownServer;
