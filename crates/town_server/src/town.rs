//! A town: one shared session and its event loop.
//!
//! All state of a town lives in a single [`Town`] value owned by one task.
//! Connections never touch it directly; they send [`TownEvent`]s through an
//! unbounded channel and the town handles them one at a time, each to
//! completion. Events from one connection are handled in the order they were
//! sent because each connection feeds the channel from a single reader task.

use crate::area::GameArea;
use crate::connection::{ConnectionId, Outbound, Room, RoomEmitter};
use crate::player::TownPlayer;
use crate::router::route_command;
use game_session::{MapDescription, RecipeGame};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use town_types::{CommandEnvelope, PlayerId, PlayerLocation, ServerMessage};
use tracing::{debug, info, trace, warn};

/// Everything a connection can ask of its town.
#[derive(Debug)]
pub enum TownEvent {
    /// A connection joins. The town replies with the minted player id.
    Join {
        connection: ConnectionId,
        user_name: String,
        outbound: Outbound,
        reply: oneshot::Sender<PlayerId>,
    },
    /// Town-level movement.
    Movement {
        connection: ConnectionId,
        location: PlayerLocation,
    },
    /// Movement inside a running game.
    GameMovement {
        connection: ConnectionId,
        location: PlayerLocation,
    },
    /// An interactable command.
    Command {
        connection: ConnectionId,
        envelope: CommandEnvelope,
    },
    /// The connection closed.
    Disconnected { connection: ConnectionId },
}

#[derive(Debug)]
pub struct Town {
    id: String,
    friendly_name: String,
    room: Room,
    players: HashMap<ConnectionId, TownPlayer>,
    areas: Vec<GameArea>,
}

impl Town {
    /// Builds a town with one game area per region of the map.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier clients use in `joinTown`
    /// * `friendly_name` - Display name sent to clients
    /// * `map` - Regions and station layouts
    /// * `rules` - Rules shared by every game area
    pub fn new(
        id: impl Into<String>,
        friendly_name: impl Into<String>,
        map: &MapDescription,
        rules: RecipeGame,
    ) -> Self {
        let areas = map
            .regions
            .iter()
            .map(|region| GameArea::new(region.clone(), rules.clone()))
            .collect();
        Self {
            id: id.into(),
            friendly_name: friendly_name.into(),
            room: Room::new(),
            players: HashMap::new(),
            areas,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, connection: ConnectionId) -> Option<&TownPlayer> {
        self.players.get(&connection)
    }

    pub fn areas(&self) -> &[GameArea] {
        &self.areas
    }

    pub fn area(&self, id: &str) -> Option<&GameArea> {
        self.areas.iter().find(|area| area.id() == id)
    }

    pub fn handle_event(&mut self, event: TownEvent) {
        match event {
            TownEvent::Join {
                connection,
                user_name,
                outbound,
                reply,
            } => {
                let player_id = self.join(connection, user_name, outbound);
                if reply.send(player_id).is_err() {
                    debug!("Connection {} left before its join completed", connection);
                }
            }
            TownEvent::Movement {
                connection,
                location,
            } => self.move_player(connection, location),
            TownEvent::GameMovement {
                connection,
                location,
            } => self.move_in_game(connection, location),
            TownEvent::Command {
                connection,
                envelope,
            } => self.command(connection, &envelope),
            TownEvent::Disconnected { connection } => self.disconnect(connection),
        }
    }

    /// Adds a connection to the town and introduces it to everyone.
    pub fn join(
        &mut self,
        connection: ConnectionId,
        user_name: impl Into<String>,
        outbound: Outbound,
    ) -> PlayerId {
        if let Some(existing) = self.players.get(&connection) {
            warn!("Connection {} joined town {} twice", connection, self.id);
            return existing.id;
        }
        let player = TownPlayer::new(connection, user_name);
        let player_id = player.id;
        let model = player.to_model();
        self.players.insert(connection, player);
        self.room.join(connection, outbound);

        self.room.send_to(
            connection,
            &ServerMessage::Initialize {
                own_id: player_id,
                town_id: self.id.clone(),
                friendly_name: self.friendly_name.clone(),
                players: self.players.values().map(TownPlayer::to_model).collect(),
                interactables: self.areas.iter().map(GameArea::to_model).collect(),
            },
        );
        self.room.emit(&ServerMessage::PlayerJoined(model));
        info!(
            "👋 Player {} joined town {} ({} present)",
            player_id,
            self.id,
            self.players.len()
        );
        player_id
    }

    /// Stores a town-level location, broadcasts it and refreshes occupancy.
    pub fn move_player(&mut self, connection: ConnectionId, location: PlayerLocation) {
        let Some(player) = self.players.get_mut(&connection) else {
            return;
        };
        player.location = location;
        let player_id = player.id;
        self.room.emit(&ServerMessage::PlayerMoved(player.to_model()));

        for area in self.areas.iter_mut() {
            if area.update_occupancy(player_id, &player.location) {
                self.room.emit(&ServerMessage::InteractableUpdate {
                    interactable: area.to_model(),
                });
            }
        }
    }

    /// Hands in-game movement to every region watching this connection.
    pub fn move_in_game(&mut self, connection: ConnectionId, location: PlayerLocation) {
        let Some(player) = self.players.get(&connection) else {
            return;
        };
        let routes = player.handle.move_listeners();
        if routes.is_empty() {
            trace!("Dropping game movement from {}: not in a running game", player.id);
            return;
        }
        for route in routes {
            if let Some(area) = self.areas.iter_mut().find(|area| area.id() == route.area) {
                area.handle_motion(player.id, location.clone(), &self.room);
            }
        }
    }

    /// Routes one command and answers the sender.
    pub fn command(&mut self, connection: ConnectionId, envelope: &CommandEnvelope) {
        let Some(player) = self.players.get(&connection) else {
            warn!("Command from connection {} which never joined town {}", connection, self.id);
            return;
        };
        let response = route_command(&mut self.areas, player, envelope, &self.room);
        self.room
            .send_to(connection, &ServerMessage::CommandResponse(response));
    }

    /// Releases everything a closed connection held, then says goodbye.
    pub fn disconnect(&mut self, connection: ConnectionId) {
        self.room.leave(connection);
        let Some(player) = self.players.remove(&connection) else {
            return;
        };
        for listener in player.handle.disconnect_listeners() {
            if let Some(area) = self.areas.iter_mut().find(|area| area.id() == listener.area) {
                area.handle_disconnect(player.id, &self.room);
            }
        }
        for area in self.areas.iter_mut() {
            if area.remove_occupant(player.id) {
                self.room.emit(&ServerMessage::InteractableUpdate {
                    interactable: area.to_model(),
                });
            }
        }
        self.room
            .emit(&ServerMessage::PlayerDisconnect { id: player.id });
        info!("👋 Player {} left town {}", player.id, self.id);
    }

    /// Advances every running game clock.
    pub fn tick(&mut self, seconds: u32) {
        for area in self.areas.iter_mut() {
            area.tick(seconds, &self.room);
        }
    }

    /// Runs the town until its event channel closes or shutdown is signalled.
    ///
    /// # Arguments
    ///
    /// * `events` - Inbound events from every connection in the town
    /// * `tick_interval` - Clock resolution; zero disables the clock
    /// * `shutdown` - Broadcast shutdown signal
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<TownEvent>,
        tick_interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        info!(
            "🏘️ Town {} ({}) open with {} game area(s)",
            self.id,
            self.friendly_name,
            self.areas.len()
        );
        let tick_ms = u64::try_from(tick_interval.as_millis()).unwrap_or(u64::MAX);
        let ticking = tick_ms > 0;
        let mut ticker = interval(if ticking {
            tick_interval
        } else {
            Duration::from_secs(1)
        });
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        let mut elapsed_ms: u64 = 0;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = ticker.tick(), if ticking => {
                    elapsed_ms = elapsed_ms.saturating_add(tick_ms);
                    let seconds = elapsed_ms / 1000;
                    elapsed_ms %= 1000;
                    if seconds > 0 {
                        self.tick(u32::try_from(seconds).unwrap_or(u32::MAX));
                    }
                }
                _ = shutdown.recv() => {
                    info!("🛑 Town {} shutting down", self.id);
                    break;
                }
            }
        }
    }
}
