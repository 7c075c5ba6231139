//! Error types for the town server shell.

use game_session::MapError;
use thiserror::Error;

/// Failures of the server infrastructure itself.
///
/// Game rule violations never surface here; they are answered on the
/// connection that caused them.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket setup, bind or accept failures
    #[error("Network error: {0}")]
    Network(String),

    /// Corrupt map data while building a town
    #[error("Map error: {0}")]
    Map(#[from] MapError),

    /// A town id was registered twice
    #[error("Town {0} is already registered")]
    DuplicateTown(String),

    /// Anything else that went wrong inside the server
    #[error("Internal error: {0}")]
    Internal(String),
}
