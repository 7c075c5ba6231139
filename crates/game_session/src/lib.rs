//! # Game Session
//!
//! The synchronous core of the town coordinator: game state machines, the
//! kitchen recipe game, stations and their validator, and the map loader that
//! turns a tiled map description into regions and stations.
//!
//! Nothing in here performs I/O beyond reading a map file, and nothing is
//! async. The server crate owns every [`GameInstance`] and drives it from a
//! single event loop per town.
//!
//! ## State machines
//!
//! [`GameRules`] describes one kind of game as a set of pure transformations
//! from one state value to the next. [`GameInstance`] owns the current value
//! and swaps it wholesale on every successful call, reporting the phase change
//! as a [`Transition`].
//!
//! ## Errors
//!
//! * [`GameError`] - recoverable, client-visible rejections
//! * [`MapError`] - corrupt static map data, fatal at load time

pub mod error;
pub mod map;
pub mod recipe;
pub mod rules;
pub mod station;
pub mod undercooked;

pub use error::{GameError, GameResult, MapError, MapResult};
pub use map::{MapDescription, RegionSpec, OBJECT_LAYER};
pub use recipe::{FixedRecipes, RandomRecipes, RecipeSource};
pub use rules::{GameInstance, GameRules, Transition};
pub use station::{validate_stations, Station, StationKind};
pub use undercooked::{GameSettings, RecipeGame, RecipeGameState, RecipeMove};

pub use town_types::GamePhase;
