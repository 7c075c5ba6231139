//! Error types for game sessions and map loading

use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;

/// Client-visible rejection of a game command.
///
/// The display string of each variant is the exact message sent back to the
/// client, so keep them short and stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Player is already in this game")]
    PlayerAlreadyInGame,

    #[error("Game is full")]
    GameFull,

    #[error("Player is not in this game")]
    PlayerNotInGame,

    #[error("Game is not in a startable state")]
    GameNotStartable,

    #[error("Game is not in progress")]
    GameNotInProgress,

    #[error("Game ID mismatch")]
    GameIdMismatch,

    #[error("Invalid game piece")]
    InvalidGamePiece,

    #[error("Invalid command")]
    InvalidCommand,

    #[error("No such interactable {0}")]
    NoSuchInteractable(String),

    #[error("Unknown error")]
    Unknown,
}

/// Corrupt or unreadable map data.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to read map file {0}: {1}")]
    FileRead(PathBuf, IoError),

    #[error("Failed to parse map description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Map has no '{0}' object layer")]
    MissingObjectLayer(String),

    #[error("Malformed map object {name}: {reason}")]
    MalformedMapObject { name: String, reason: String },

    #[error("Unknown area type {kind} on map object {name}")]
    UnknownAreaType { name: String, kind: String },

    #[error("Expected all interactable IDs to be unique, but found duplicate interactable ID {0}")]
    DuplicateStationId(String),

    #[error("Expected all game area IDs to be unique, but found duplicate area ID {0}")]
    DuplicateRegionId(String),

    #[error("Expected interactables not to overlap, but found overlap between {0} and {1}")]
    OverlappingStations(String, String),
}

pub type GameResult<T> = Result<T, GameError>;
pub type MapResult<T> = Result<T, MapError>;
