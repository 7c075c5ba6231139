//! JSON wire protocol.
//!
//! Every frame is a JSON text message tagged by a `type` field. Field names
//! are camelCase, with id suffixes spelled `ID` to match browser clients.
//!
//! ## Inbound
//!
//! * `joinTown` - first frame on every connection
//! * `playerMovement` - town-level movement, drives region occupancy
//! * `gameMovement` - movement inside a running game, fanned out by the game
//! * `interactableCommand` - a correlated [`CommandEnvelope`]
//!
//! ## Outbound
//!
//! Presence events, movement, region updates, command responses and
//! uncorrelated protocol errors. See [`ServerMessage`].

use crate::{GameInstanceId, Ingredient, PlayerId, PlayerLocation};
use serde::{Deserialize, Serialize};

/// A frame sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinTown {
        #[serde(rename = "townID")]
        town_id: String,
        #[serde(rename = "userName")]
        user_name: String,
    },
    PlayerMovement {
        location: PlayerLocation,
    },
    GameMovement {
        location: PlayerLocation,
    },
    #[serde(rename = "interactableCommand")]
    Command(CommandEnvelope),
}

/// A correlated request aimed at one interactable.
///
/// The body is kept as raw JSON until routing so that a malformed body can
/// still be answered with the caller's `commandID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(rename = "commandID")]
    pub command_id: String,
    #[serde(rename = "interactableID")]
    pub interactable_id: String,
    #[serde(default)]
    pub command: serde_json::Value,
}

impl CommandEnvelope {
    pub fn new(
        command_id: impl Into<String>,
        interactable_id: impl Into<String>,
        command: &InteractableCommand,
    ) -> Self {
        Self {
            command_id: command_id.into(),
            interactable_id: interactable_id.into(),
            command: serde_json::to_value(command).unwrap_or_default(),
        }
    }

    /// Decodes the typed command carried by this envelope.
    pub fn parse_command(&self) -> Result<InteractableCommand, serde_json::Error> {
        InteractableCommand::deserialize(&self.command)
    }
}

/// Commands understood by game regions and their stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InteractableCommand {
    JoinGame,
    LeaveGame {
        #[serde(rename = "gameID", default)]
        game_id: String,
    },
    StartGame {
        #[serde(rename = "gameID", default)]
        game_id: String,
    },
    GameMove {
        #[serde(rename = "gameID")]
        game_id: String,
        #[serde(rename = "move")]
        game_move: GameMovePayload,
    },
}

/// The `move` body of a `GameMove`. The piece stays a string until the game
/// validates it against the ingredient vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMovePayload {
    #[serde(rename = "gamePiece")]
    pub game_piece: String,
}

/// The answer to one [`CommandEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(rename = "commandID")]
    pub command_id: String,
    #[serde(rename = "interactableID")]
    pub interactable_id: String,
    #[serde(rename = "isOK")]
    pub is_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn ok(
        envelope: &CommandEnvelope,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            command_id: envelope.command_id.clone(),
            interactable_id: envelope.interactable_id.clone(),
            is_ok: true,
            payload,
            error: None,
        }
    }

    pub fn failure(envelope: &CommandEnvelope, error: impl Into<String>) -> Self {
        Self {
            command_id: envelope.command_id.clone(),
            interactable_id: envelope.interactable_id.clone(),
            is_ok: false,
            payload: None,
            error: Some(error.into()),
        }
    }
}

/// Lifecycle phase of a game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    WaitingForPlayers,
    WaitingToStart,
    InProgress,
    Over,
}

/// Client view of the kitchen game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeGameModel {
    pub status: GamePhase,
    pub player_one: Option<PlayerId>,
    pub player_two: Option<PlayerId>,
    pub player_one_ready: bool,
    pub player_two_ready: bool,
    pub current_recipe: Vec<Ingredient>,
    pub current_assembled: Vec<Ingredient>,
    pub score: u32,
    pub time_remaining: u32,
}

/// Client view of one game instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInstanceModel<S> {
    pub id: GameInstanceId,
    pub players: Vec<PlayerId>,
    pub state: S,
}

/// Client view of a game region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionModel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "occupantsByID")]
    pub occupants: Vec<PlayerId>,
    pub game: Option<GameInstanceModel<RecipeGameModel>>,
}

/// Client view of a player. `id` is the town id for town-level events and
/// the in-game id for movement broadcast from inside a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerModel {
    pub id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub location: PlayerLocation,
}

/// A frame sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Initialize {
        #[serde(rename = "ownID")]
        own_id: PlayerId,
        #[serde(rename = "townID")]
        town_id: String,
        #[serde(rename = "friendlyName")]
        friendly_name: String,
        players: Vec<PlayerModel>,
        interactables: Vec<RegionModel>,
    },
    PlayerJoined(PlayerModel),
    PlayerDisconnect {
        id: PlayerId,
    },
    PlayerMoved(PlayerModel),
    InteractableUpdate {
        interactable: RegionModel,
    },
    CommandResponse(CommandResponse),
    Error {
        message: String,
    },
}
