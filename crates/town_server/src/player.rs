//! Players present in a town.

use crate::connection::{ConnectionHandle, ConnectionId};
use town_types::{PlayerId, PlayerLocation, PlayerModel};

/// A connection that has joined a town.
#[derive(Debug, Clone)]
pub struct TownPlayer {
    pub id: PlayerId,
    pub user_name: String,
    pub location: PlayerLocation,
    pub handle: ConnectionHandle,
}

impl TownPlayer {
    /// Creates a player with a freshly minted town identity.
    pub fn new(connection: ConnectionId, user_name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            user_name: user_name.into(),
            location: PlayerLocation::default(),
            handle: ConnectionHandle::new(connection),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.handle.connection_id()
    }

    /// Town-level view of this player.
    pub fn to_model(&self) -> PlayerModel {
        PlayerModel {
            id: self.id.to_string(),
            user_name: self.user_name.clone(),
            location: self.location.clone(),
        }
    }
}
