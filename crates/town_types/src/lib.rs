//! # Town Types
//!
//! Shared vocabulary for the town coordinator: identities, map geometry, the
//! ingredient set used by the kitchen game, and the JSON wire protocol spoken
//! over each client's WebSocket.
//!
//! Two player identities exist and must never be mixed up:
//!
//! * [`PlayerId`] - the *town identity*, minted once per connection when the
//!   client joins a town. It is stable for the life of that connection.
//! * [`InGameId`] - the *in-game identity*, minted fresh every time a player
//!   enters a game instance. Broadcasts scoped to one game use this id.
//!
//! Everything in this crate is plain data. No I/O and no async.

pub mod geometry;
pub mod ids;
pub mod ingredient;
pub mod protocol;

pub use geometry::{BoundingBox, Direction, PlayerLocation};
pub use ids::{GameInstanceId, InGameId, PlayerId};
pub use ingredient::{Ingredient, UnknownIngredient};
pub use protocol::{
    ClientMessage, CommandEnvelope, CommandResponse, GameInstanceModel, GameMovePayload,
    GamePhase, InteractableCommand, PlayerModel, RecipeGameModel, RegionModel, ServerMessage,
};
