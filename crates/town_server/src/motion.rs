//! In-game movement fan-out.
//!
//! Each game region owns one [`MotionBroadcaster`]. Participants are
//! registered when they join the game and watched once it starts: watching
//! installs a movement listener on the participant's connection, and every
//! movement event then overwrites that participant's stored location and is
//! broadcast to the whole room under the participant's in-game id.
//!
//! Events are never buffered or coalesced. One inbound movement produces
//! exactly one outbound broadcast.

use crate::connection::{ConnectionHandle, MoveListener, RoomEmitter, Subscription};
use std::collections::HashMap;
use town_types::{InGameId, PlayerId, PlayerLocation, PlayerModel, ServerMessage};
use tracing::trace;

#[derive(Debug)]
struct TrackedPlayer {
    in_game: InGameId,
    user_name: String,
    location: PlayerLocation,
    watch: Option<Subscription>,
}

#[derive(Debug)]
pub struct MotionBroadcaster {
    area: String,
    tracked: HashMap<PlayerId, TrackedPlayer>,
}

impl MotionBroadcaster {
    pub fn new(area: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            tracked: HashMap::new(),
        }
    }

    /// Starts tracking a participant. Registering again replaces the previous
    /// entry and drops its listener.
    pub fn register(
        &mut self,
        player: PlayerId,
        in_game: InGameId,
        user_name: &str,
        location: PlayerLocation,
    ) {
        self.tracked.insert(
            player,
            TrackedPlayer {
                in_game,
                user_name: user_name.to_string(),
                location,
                watch: None,
            },
        );
    }

    /// Stops tracking a participant and drops its listener.
    pub fn deregister(&mut self, player: PlayerId) -> bool {
        self.tracked.remove(&player).is_some()
    }

    pub fn deregister_all(&mut self) {
        self.tracked.clear();
    }

    /// Installs a movement listener for a registered participant.
    ///
    /// Idempotent: a participant that is already watched keeps its single
    /// listener.
    ///
    /// # Returns
    ///
    /// `false` if the participant is not registered.
    pub fn watch(&mut self, player: PlayerId, handle: &ConnectionHandle) -> bool {
        let Some(tracked) = self.tracked.get_mut(&player) else {
            return false;
        };
        if tracked.watch.is_none() {
            tracked.watch = Some(handle.on_move(MoveListener {
                area: self.area.clone(),
            }));
        }
        true
    }

    /// Removes a participant's movement listener. No-op when none is installed.
    pub fn stop_watching(&mut self, player: PlayerId) {
        if let Some(tracked) = self.tracked.get_mut(&player) {
            tracked.watch = None;
        }
    }

    pub fn is_watching(&self, player: PlayerId) -> bool {
        self.tracked
            .get(&player)
            .is_some_and(|tracked| tracked.watch.is_some())
    }

    pub fn location(&self, player: PlayerId) -> Option<&PlayerLocation> {
        self.tracked.get(&player).map(|tracked| &tracked.location)
    }

    pub fn in_game_id(&self, player: PlayerId) -> Option<InGameId> {
        self.tracked.get(&player).map(|tracked| tracked.in_game)
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Applies one movement event from a watched participant.
    ///
    /// # Returns
    ///
    /// `true` if the location was stored and broadcast.
    pub fn update_location(
        &mut self,
        player: PlayerId,
        location: PlayerLocation,
        room: &dyn RoomEmitter,
    ) -> bool {
        let Some(tracked) = self.tracked.get_mut(&player) else {
            return false;
        };
        if tracked.watch.is_none() {
            trace!("Ignoring movement from unwatched player {}", player);
            return false;
        }
        tracked.location = location;
        room.emit(&ServerMessage::PlayerMoved(PlayerModel {
            id: tracked.in_game.to_string(),
            user_name: tracked.user_name.clone(),
            location: tracked.location.clone(),
        }));
        true
    }
}
