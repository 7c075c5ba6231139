//! Game regions: one map region bound to one replaceable game instance.
//!
//! A [`GameArea`] owns everything about a kitchen region:
//!
//! * the current [`GameInstance`], recreated when a player joins after the
//!   previous game reached `OVER`
//! * the stations, which only exist while the game is in progress
//! * each participant's listener subscriptions
//! * the region's [`MotionBroadcaster`]
//!
//! It is the sole mutator of its game. Every successful mutation is followed
//! by an `interactableUpdate` broadcast carrying [`GameArea::to_model`].
//! Failed commands broadcast nothing.

use crate::connection::{
    CommandListener, ConnectionHandle, DisconnectListener, RoomEmitter, Subscription,
};
use crate::motion::MotionBroadcaster;
use crate::player::TownPlayer;
use game_session::{
    validate_stations, GameError, GameInstance, GameRules, MapError, RecipeGame, RecipeMove,
    RegionSpec, Station, StationKind, Transition,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;
use town_types::{
    BoundingBox, GamePhase, InGameId, Ingredient, InteractableCommand, PlayerId, PlayerLocation,
    RegionModel, ServerMessage,
};
use tracing::{debug, info};

/// Interactable type reported for kitchen regions.
pub const AREA_KIND: &str = "UndercookedArea";

/// Why a command against a region failed.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A rule violation the client should be told about.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The region's station layout is corrupt.
    #[error("Corrupt station layout in area {area}: {source}")]
    Config {
        area: String,
        #[source]
        source: MapError,
    },
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug)]
struct Participant {
    handle: ConnectionHandle,
    commands: Option<Subscription>,
    _disconnect: Subscription,
}

#[derive(Debug)]
pub struct GameArea {
    id: String,
    bounds: BoundingBox,
    occupants: Vec<PlayerId>,
    station_layout: Vec<Station>,
    stations: Vec<Station>,
    rules: RecipeGame,
    game: Option<GameInstance<RecipeGame>>,
    participants: HashMap<PlayerId, Participant>,
    motion: MotionBroadcaster,
}

impl GameArea {
    /// Creates an idle region from its map description.
    ///
    /// # Arguments
    ///
    /// * `spec` - Region bounds and station layout from the map
    /// * `rules` - Rules cloned into every new game instance
    pub fn new(spec: RegionSpec, rules: RecipeGame) -> Self {
        Self {
            motion: MotionBroadcaster::new(spec.id.clone()),
            id: spec.id,
            bounds: spec.bounds,
            occupants: Vec::new(),
            station_layout: spec.stations,
            stations: Vec::new(),
            rules,
            game: None,
            participants: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn occupants(&self) -> &[PlayerId] {
        &self.occupants
    }

    pub fn game(&self) -> Option<&GameInstance<RecipeGame>> {
        self.game.as_ref()
    }

    /// Stations of the running game. Empty unless a game is in progress.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn has_station(&self, station_id: &str) -> bool {
        self.stations.iter().any(|station| station.id == station_id)
    }

    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.participants.contains_key(&player)
    }

    pub fn in_game_id(&self, player: PlayerId) -> Option<InGameId> {
        self.motion.in_game_id(player)
    }

    pub fn to_model(&self) -> RegionModel {
        RegionModel {
            id: self.id.clone(),
            kind: AREA_KIND.to_string(),
            occupants: self.occupants.clone(),
            game: self.game.as_ref().map(GameInstance::to_model),
        }
    }

    /// Recomputes whether `player` stands inside this region.
    ///
    /// # Returns
    ///
    /// `true` if the occupant set changed.
    pub fn update_occupancy(&mut self, player: PlayerId, location: &PlayerLocation) -> bool {
        let inside = self.bounds.contains(location.x, location.y);
        let present = self.occupants.contains(&player);
        match (inside, present) {
            (true, false) => {
                self.occupants.push(player);
                true
            }
            (false, true) => self.remove_occupant(player),
            _ => false,
        }
    }

    pub fn remove_occupant(&mut self, player: PlayerId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|occupant| *occupant != player);
        self.occupants.len() != before
    }

    /// Handles a command addressed to the region itself.
    ///
    /// # Returns
    ///
    /// The success payload: `{"gameID": ...}` for `JoinGame`, nothing otherwise.
    pub fn handle_command(
        &mut self,
        player: &TownPlayer,
        command: InteractableCommand,
        room: &dyn RoomEmitter,
    ) -> CommandResult<Option<Value>> {
        match command {
            InteractableCommand::JoinGame => self.join_game(player, room),
            InteractableCommand::LeaveGame { .. } => self.leave_game(player.id, room),
            InteractableCommand::StartGame { .. } => self.start_game(player.id, room),
            InteractableCommand::GameMove { game_id, game_move } => {
                self.apply_move(player.id, &game_id, &game_move.game_piece, None, room)
            }
        }
    }

    /// Handles a command addressed to one of this region's active stations.
    pub fn handle_station_command(
        &mut self,
        player: &TownPlayer,
        station_id: &str,
        command: InteractableCommand,
        room: &dyn RoomEmitter,
    ) -> CommandResult<Option<Value>> {
        let listening = self
            .participants
            .get(&player.id)
            .is_some_and(|participant| participant.commands.is_some());
        let station = self
            .stations
            .iter()
            .find(|station| station.id == station_id)
            .filter(|_| listening)
            .ok_or_else(|| GameError::NoSuchInteractable(station_id.to_string()))?;

        match (station.kind, command) {
            (
                StationKind::Ingredient(dispensed),
                InteractableCommand::GameMove { game_id, game_move },
            ) => self.apply_move(
                player.id,
                &game_id,
                &game_move.game_piece,
                Some(dispensed),
                room,
            ),
            _ => Err(GameError::InvalidCommand.into()),
        }
    }

    /// Feeds one in-game movement event to the region's broadcaster.
    pub fn handle_motion(
        &mut self,
        player: PlayerId,
        location: PlayerLocation,
        room: &dyn RoomEmitter,
    ) -> bool {
        self.motion.update_location(player, location, room)
    }

    /// Removes a disconnected participant as if they had left the game.
    pub fn handle_disconnect(&mut self, player: PlayerId, room: &dyn RoomEmitter) {
        let left = self.game.as_mut().map(|game| game.leave(player));
        self.release(player);
        match left {
            Some(Ok(transition)) => {
                info!("🚪 Player {} dropped out of area {}", player, self.id);
                self.after_mutation(transition, room);
            }
            Some(Err(e)) => debug!("Disconnect of {} left area {} untouched: {}", player, self.id, e),
            None => {}
        }
    }

    /// Runs the game clock forward by whole seconds.
    pub fn tick(&mut self, seconds: u32, room: &dyn RoomEmitter) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        if game.phase() != GamePhase::InProgress {
            return;
        }
        let transition = game.advance_clock(seconds);
        self.after_mutation(transition, room);
    }

    fn join_game(
        &mut self,
        player: &TownPlayer,
        room: &dyn RoomEmitter,
    ) -> CommandResult<Option<Value>> {
        let finished = self
            .game
            .as_ref()
            .map_or(true, |game| game.phase() == GamePhase::Over);
        let game = if finished {
            self.end_match();
            let game = GameInstance::new(self.rules.clone());
            info!("🎲 New game {} created in area {}", game.id(), self.id);
            self.game.insert(game)
        } else {
            self.game.as_mut().ok_or(GameError::Unknown)?
        };

        let transition = game.join(player.id)?;
        let game_id = game.id();

        self.motion.register(
            player.id,
            InGameId::new(),
            &player.user_name,
            player.location.clone(),
        );
        let disconnect = player.handle.on_disconnect(DisconnectListener {
            area: self.id.clone(),
        });
        self.participants.insert(
            player.id,
            Participant {
                handle: player.handle.clone(),
                commands: None,
                _disconnect: disconnect,
            },
        );

        self.after_mutation(transition, room);
        Ok(Some(json!({ "gameID": game_id.to_string() })))
    }

    fn leave_game(&mut self, player: PlayerId, room: &dyn RoomEmitter) -> CommandResult<Option<Value>> {
        let game = self.game.as_mut().ok_or(GameError::GameNotInProgress)?;
        let transition = game.leave(player)?;
        self.release(player);
        self.after_mutation(transition, room);
        Ok(None)
    }

    fn start_game(&mut self, player: PlayerId, room: &dyn RoomEmitter) -> CommandResult<Option<Value>> {
        let game = self.game.as_mut().ok_or(GameError::GameNotStartable)?;
        let next = game.rules().start(game.state(), player)?;
        let starting =
            game.phase() != GamePhase::InProgress && RecipeGame::phase(&next) == GamePhase::InProgress;
        if starting {
            validate_stations(&self.station_layout).map_err(|source| CommandError::Config {
                area: self.id.clone(),
                source,
            })?;
        }
        let transition = game.replace_state(next);
        if transition.started() {
            self.begin_match();
        }
        self.after_mutation(transition, room);
        Ok(None)
    }

    fn apply_move(
        &mut self,
        player: PlayerId,
        game_id: &str,
        piece: &str,
        dispensed: Option<Ingredient>,
        room: &dyn RoomEmitter,
    ) -> CommandResult<Option<Value>> {
        let game = self.game.as_mut().ok_or(GameError::GameNotInProgress)?;
        if game.id().to_string() != game_id {
            return Err(GameError::GameIdMismatch.into());
        }
        let game_move = RecipeMove::from_piece(piece)?;
        if dispensed.is_some_and(|ingredient| ingredient != game_move.ingredient) {
            return Err(GameError::InvalidGamePiece.into());
        }
        let transition = game.apply_move(player, &game_move)?;
        self.after_mutation(transition, room);
        Ok(None)
    }

    fn begin_match(&mut self) {
        self.stations = self.station_layout.clone();
        for (player, participant) in self.participants.iter_mut() {
            self.motion.watch(*player, &participant.handle);
            participant.commands = Some(participant.handle.on_command(CommandListener {
                area: self.id.clone(),
            }));
        }
        info!(
            "🍳 Game started in area {} with {} stations",
            self.id,
            self.stations.len()
        );
    }

    fn end_match(&mut self) {
        self.stations.clear();
        self.motion.deregister_all();
        self.participants.clear();
    }

    fn release(&mut self, player: PlayerId) {
        self.participants.remove(&player);
        self.motion.deregister(player);
    }

    fn after_mutation(&mut self, transition: Transition, room: &dyn RoomEmitter) {
        if transition.ended() {
            if let Some(game) = &self.game {
                info!(
                    "🏁 Game {} in area {} is over with score {}",
                    game.id(),
                    self.id,
                    game.state().score
                );
            }
            self.end_match();
        }
        room.emit(&ServerMessage::InteractableUpdate {
            interactable: self.to_model(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Room, OUTBOUND_CAPACITY};
    use game_session::{FixedRecipes, GameSettings};
    use std::sync::Arc;
    use tokio::sync::mpsc::{self, Receiver};
    use town_types::{CommandEnvelope, GameMovePayload};
    use Ingredient::*;

    fn station(id: &str, x: f64, kind: StationKind) -> Station {
        Station::new(id, BoundingBox::new(x, 10.0, 30.0, 30.0), kind)
    }

    fn layout() -> Vec<Station> {
        vec![
            station("SteakStation", 0.0, StationKind::Ingredient(Steak)),
            station("RiceStation", 50.0, StationKind::Ingredient(Rice)),
            station("SaladStation", 100.0, StationKind::Ingredient(Salad)),
            station("Bin", 150.0, StationKind::Trash),
        ]
    }

    fn area_with(stations: Vec<Station>) -> GameArea {
        let rules = RecipeGame::new(
            Arc::new(FixedRecipes::new([
                vec![Steak, Rice, Salad],
                vec![Egg, Milk, Fries],
            ])),
            GameSettings::default(),
        );
        GameArea::new(
            RegionSpec {
                id: "Kitchen".into(),
                bounds: BoundingBox::new(0.0, 0.0, 400.0, 300.0),
                stations,
            },
            rules,
        )
    }

    struct Fixture {
        area: GameArea,
        room: Room,
        ada: TownPlayer,
        bob: TownPlayer,
        rx: Receiver<String>,
    }

    fn fixture(stations: Vec<Station>) -> Fixture {
        let mut room = Room::new();
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        room.join(1, tx);
        Fixture {
            area: area_with(stations),
            room,
            ada: TownPlayer::new(1, "ada"),
            bob: TownPlayer::new(2, "bob"),
            rx,
        }
    }

    fn game_id(area: &GameArea) -> String {
        area.game().unwrap().id().to_string()
    }

    fn start_both(f: &mut Fixture) {
        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        f.area.handle_command(&f.bob, InteractableCommand::JoinGame, &f.room).unwrap();
        let id = game_id(&f.area);
        f.area
            .handle_command(&f.ada, InteractableCommand::StartGame { game_id: id.clone() }, &f.room)
            .unwrap();
        f.area
            .handle_command(&f.bob, InteractableCommand::StartGame { game_id: id }, &f.room)
            .unwrap();
    }

    fn pickup(game_id: &str, piece: &str) -> InteractableCommand {
        InteractableCommand::GameMove {
            game_id: game_id.to_string(),
            game_move: GameMovePayload {
                game_piece: piece.to_string(),
            },
        }
    }

    fn last_update(rx: &mut Receiver<String>) -> RegionModel {
        let mut last = None;
        while let Ok(text) = rx.try_recv() {
            if let ServerMessage::InteractableUpdate { interactable } =
                serde_json::from_str::<ServerMessage>(&text).unwrap()
            {
                last = Some(interactable);
            }
        }
        last.expect("no region update was broadcast")
    }

    fn phase(area: &GameArea) -> GamePhase {
        area.game().unwrap().phase()
    }

    #[test]
    fn join_creates_a_game_and_reports_its_id() {
        let mut f = fixture(layout());
        let payload = f
            .area
            .handle_command(&f.ada, InteractableCommand::JoinGame, &f.room)
            .unwrap()
            .unwrap();
        assert_eq!(payload["gameID"], json!(game_id(&f.area)));
        assert!(f.area.is_participant(f.ada.id));

        let update = last_update(&mut f.rx);
        assert_eq!(update.kind, AREA_KIND);
        let game = update.game.unwrap();
        assert_eq!(game.state.status, GamePhase::WaitingForPlayers);
        assert_eq!(game.state.player_one, Some(f.ada.id));
    }

    #[test]
    fn second_join_waits_to_start() {
        let mut f = fixture(layout());
        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        f.area.handle_command(&f.bob, InteractableCommand::JoinGame, &f.room).unwrap();
        let update = last_update(&mut f.rx);
        assert_eq!(update.game.unwrap().state.status, GamePhase::WaitingToStart);
    }

    #[test]
    fn failed_commands_broadcast_nothing() {
        let mut f = fixture(layout());
        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        while f.rx.try_recv().is_ok() {}

        let err = f
            .area
            .handle_command(&f.ada, InteractableCommand::JoinGame, &f.room)
            .unwrap_err();
        assert!(matches!(err, CommandError::Game(GameError::PlayerAlreadyInGame)));
        assert!(f.rx.try_recv().is_err());
    }

    #[test]
    fn commands_without_a_game_are_rejected() {
        let mut f = fixture(layout());
        let leave = f.area.handle_command(
            &f.ada,
            InteractableCommand::LeaveGame { game_id: String::new() },
            &f.room,
        );
        assert!(matches!(leave, Err(CommandError::Game(GameError::GameNotInProgress))));
        let start = f.area.handle_command(
            &f.ada,
            InteractableCommand::StartGame { game_id: String::new() },
            &f.room,
        );
        assert!(matches!(start, Err(CommandError::Game(GameError::GameNotStartable))));
        let play = f.area.handle_command(&f.ada, pickup("x", "Egg"), &f.room);
        assert!(matches!(play, Err(CommandError::Game(GameError::GameNotInProgress))));
    }

    #[test]
    fn starting_activates_stations_and_listeners() {
        let mut f = fixture(layout());
        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        f.area.handle_command(&f.bob, InteractableCommand::JoinGame, &f.room).unwrap();
        assert!(f.area.stations().is_empty());
        assert_eq!(f.ada.handle.listener_count(), 1);

        let id = game_id(&f.area);
        f.area
            .handle_command(&f.ada, InteractableCommand::StartGame { game_id: id.clone() }, &f.room)
            .unwrap();
        assert!(f.area.stations().is_empty());
        f.area
            .handle_command(&f.bob, InteractableCommand::StartGame { game_id: id }, &f.room)
            .unwrap();

        assert_eq!(phase(&f.area), GamePhase::InProgress);
        assert_eq!(f.area.stations().len(), 4);
        for player in [&f.ada, &f.bob] {
            assert_eq!(player.handle.move_listeners().len(), 1);
            assert_eq!(player.handle.command_listeners().len(), 1);
            assert_eq!(player.handle.disconnect_listeners().len(), 1);
        }
        let update = last_update(&mut f.rx);
        assert_eq!(
            update.game.unwrap().state.current_recipe,
            vec![Steak, Rice, Salad]
        );
    }

    #[test]
    fn overlapping_stations_are_a_fatal_start_error() {
        let mut f = fixture(vec![
            Station::new("A", BoundingBox::new(0.0, 0.0, 30.0, 30.0), StationKind::Trash),
            Station::new("B", BoundingBox::new(10.0, 10.0, 30.0, 30.0), StationKind::Assembly),
        ]);
        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        f.area.handle_command(&f.bob, InteractableCommand::JoinGame, &f.room).unwrap();
        let id = game_id(&f.area);
        f.area
            .handle_command(&f.ada, InteractableCommand::StartGame { game_id: id.clone() }, &f.room)
            .unwrap();
        let err = f
            .area
            .handle_command(&f.bob, InteractableCommand::StartGame { game_id: id }, &f.room)
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Config { source: MapError::OverlappingStations(..), .. }
        ));
        assert_eq!(phase(&f.area), GamePhase::WaitingToStart);
        assert!(f.area.stations().is_empty());
    }

    #[test]
    fn disjoint_stations_start_cleanly() {
        let mut f = fixture(vec![
            Station::new("A", BoundingBox::new(0.0, 0.0, 30.0, 30.0), StationKind::Trash),
            Station::new("B", BoundingBox::new(100.0, 100.0, 30.0, 30.0), StationKind::Assembly),
        ]);
        start_both(&mut f);
        assert_eq!(phase(&f.area), GamePhase::InProgress);
    }

    #[test]
    fn station_pickups_build_the_recipe() {
        let mut f = fixture(layout());
        start_both(&mut f);
        let id = game_id(&f.area);

        f.area
            .handle_station_command(&f.ada, "SteakStation", pickup(&id, "Steak"), &f.room)
            .unwrap();
        f.area
            .handle_station_command(&f.bob, "RiceStation", pickup(&id, "Rice"), &f.room)
            .unwrap();
        assert_eq!(
            f.area.game().unwrap().state().current_assembled,
            vec![Steak, Rice]
        );
        f.area
            .handle_station_command(&f.ada, "SaladStation", pickup(&id, "Salad"), &f.room)
            .unwrap();

        let state = f.area.game().unwrap().state();
        assert_eq!(state.score, 1);
        assert_eq!(state.current_recipe, vec![Egg, Milk, Fries]);
        assert!(state.current_assembled.is_empty());
    }

    #[test]
    fn station_rejects_foreign_pieces_and_commands() {
        let mut f = fixture(layout());
        start_both(&mut f);
        let id = game_id(&f.area);

        let wrong = f
            .area
            .handle_station_command(&f.ada, "SteakStation", pickup(&id, "Rice"), &f.room);
        assert!(matches!(wrong, Err(CommandError::Game(GameError::InvalidGamePiece))));

        let trash = f
            .area
            .handle_station_command(&f.ada, "Bin", pickup(&id, "Steak"), &f.room);
        assert!(matches!(trash, Err(CommandError::Game(GameError::InvalidCommand))));

        let join = f
            .area
            .handle_station_command(&f.ada, "SteakStation", InteractableCommand::JoinGame, &f.room);
        assert!(matches!(join, Err(CommandError::Game(GameError::InvalidCommand))));
    }

    #[test]
    fn moves_must_name_the_running_game() {
        let mut f = fixture(layout());
        start_both(&mut f);
        let mismatch = f
            .area
            .handle_command(&f.ada, pickup("not-the-game", "Steak"), &f.room);
        assert!(matches!(mismatch, Err(CommandError::Game(GameError::GameIdMismatch))));

        let id = game_id(&f.area);
        let bogus = f.area.handle_command(&f.ada, pickup(&id, "Pizza"), &f.room);
        assert!(matches!(bogus, Err(CommandError::Game(GameError::InvalidGamePiece))));
    }

    #[test]
    fn outsiders_cannot_use_stations() {
        let mut f = fixture(layout());
        start_both(&mut f);
        let id = game_id(&f.area);
        let eve = TownPlayer::new(3, "eve");
        let result = f
            .area
            .handle_station_command(&eve, "SteakStation", pickup(&id, "Steak"), &f.room);
        assert!(matches!(
            result,
            Err(CommandError::Game(GameError::NoSuchInteractable(id))) if id == "SteakStation"
        ));
    }

    #[test]
    fn leaving_mid_game_ends_it_and_releases_everyone() {
        let mut f = fixture(layout());
        start_both(&mut f);
        let id = game_id(&f.area);
        f.area
            .handle_command(&f.ada, InteractableCommand::LeaveGame { game_id: id }, &f.room)
            .unwrap();

        assert_eq!(phase(&f.area), GamePhase::Over);
        assert!(f.area.stations().is_empty());
        assert_eq!(f.ada.handle.listener_count(), 0);
        assert_eq!(f.bob.handle.listener_count(), 0);
        assert!(!f.area.is_participant(f.bob.id));
        assert_eq!(last_update(&mut f.rx).game.unwrap().state.status, GamePhase::Over);
    }

    #[test]
    fn leave_ignores_the_game_id() {
        let mut f = fixture(layout());
        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        f.area
            .handle_command(
                &f.ada,
                InteractableCommand::LeaveGame { game_id: "placeholder".into() },
                &f.room,
            )
            .unwrap();
        assert!(!f.area.is_participant(f.ada.id));
        assert_eq!(f.ada.handle.listener_count(), 0);
    }

    #[test]
    fn joining_after_game_over_starts_a_new_instance() {
        let mut f = fixture(layout());
        start_both(&mut f);
        let first = game_id(&f.area);
        f.area
            .handle_command(&f.ada, InteractableCommand::LeaveGame { game_id: first.clone() }, &f.room)
            .unwrap();

        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        assert_ne!(game_id(&f.area), first);
        assert_eq!(phase(&f.area), GamePhase::WaitingForPlayers);
    }

    #[test]
    fn in_game_ids_are_fresh_per_instance() {
        let mut f = fixture(layout());
        start_both(&mut f);
        let first = f.area.in_game_id(f.ada.id).unwrap();
        let id = game_id(&f.area);
        f.area
            .handle_command(&f.bob, InteractableCommand::LeaveGame { game_id: id }, &f.room)
            .unwrap();
        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        assert_ne!(f.area.in_game_id(f.ada.id).unwrap(), first);
    }

    #[test]
    fn clock_running_out_tears_the_match_down() {
        let mut f = fixture(layout());
        start_both(&mut f);
        f.area.tick(60, &f.room);
        assert_eq!(f.area.game().unwrap().state().time_remaining, 60);
        f.area.tick(60, &f.room);
        assert_eq!(phase(&f.area), GamePhase::Over);
        assert_eq!(f.ada.handle.listener_count(), 0);
        assert!(f.area.stations().is_empty());
    }

    #[test]
    fn idle_regions_ignore_ticks() {
        let mut f = fixture(layout());
        f.area.tick(10, &f.room);
        assert!(f.rx.try_recv().is_err());
    }

    #[test]
    fn disconnect_frees_the_slot() {
        let mut f = fixture(layout());
        f.area.handle_command(&f.ada, InteractableCommand::JoinGame, &f.room).unwrap();
        f.area.handle_command(&f.bob, InteractableCommand::JoinGame, &f.room).unwrap();
        f.area.handle_disconnect(f.ada.id, &f.room);
        let state = f.area.game().unwrap().state();
        assert_eq!(state.player_one, None);
        assert_eq!(state.phase, GamePhase::WaitingForPlayers);
        assert!(!f.area.is_participant(f.ada.id));
    }

    #[test]
    fn in_game_motion_reaches_the_room() {
        let mut f = fixture(layout());
        start_both(&mut f);
        while f.rx.try_recv().is_ok() {}
        assert!(f.area.handle_motion(f.ada.id, PlayerLocation::at(3.0, 4.0), &f.room));
        let message: ServerMessage = serde_json::from_str(&f.rx.try_recv().unwrap()).unwrap();
        let ServerMessage::PlayerMoved(model) = message else {
            panic!("expected a movement broadcast");
        };
        assert_eq!(model.id, f.area.in_game_id(f.ada.id).unwrap().to_string());
    }

    #[test]
    fn occupancy_tracks_bounds() {
        let mut f = fixture(layout());
        assert!(f.area.update_occupancy(f.ada.id, &PlayerLocation::at(10.0, 10.0)));
        assert!(!f.area.update_occupancy(f.ada.id, &PlayerLocation::at(20.0, 20.0)));
        assert_eq!(f.area.occupants(), &[f.ada.id]);
        assert!(f.area.update_occupancy(f.ada.id, &PlayerLocation::at(900.0, 20.0)));
        assert!(f.area.occupants().is_empty());
    }

    #[test]
    fn envelope_round_trip_keeps_commands_typed() {
        let envelope = CommandEnvelope::new("c", "Kitchen", &InteractableCommand::JoinGame);
        assert_eq!(envelope.parse_command().unwrap(), InteractableCommand::JoinGame);
    }
}
