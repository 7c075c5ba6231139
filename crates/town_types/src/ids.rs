//! Identity newtypes.
//!
//! All ids are UUID v4 wrappers. They serialize as the bare UUID string.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Town identity of a connected player.
///
/// Minted when a connection joins a town and kept until it disconnects.
///
/// # Examples
///
/// ```rust
/// use town_types::PlayerId;
///
/// let id = PlayerId::new();
/// let parsed: PlayerId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a player inside one game instance.
///
/// A fresh value is minted on every join, so an in-game id is never shared
/// between two game instances even when the same town player plays both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InGameId(pub Uuid);

impl InGameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InGameId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InGameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one run of a game, from first join until it is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameInstanceId(pub Uuid);

impl GameInstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
