//! # Town Server
//!
//! Real-time coordination of shared "towns": players connect over
//! WebSocket, join a town, walk around it and play two-player kitchen games
//! inside the town's game regions.
//!
//! ## Architecture
//!
//! * **[`TownServer`]** binds the listener, enforces the connection limit and
//!   spawns one handler per socket
//! * **[`TownRegistry`]** maps town ids to running towns
//! * **[`Town`]** owns all state of one town and processes [`TownEvent`]s
//!   from a single task, one event at a time
//! * **[`GameArea`]** binds a map region to its game instance, stations and
//!   [`MotionBroadcaster`]
//! * **[`router`]** turns every interactable command into exactly one
//!   correlated response
//!
//! ## Message Flow
//!
//! 1. The connection handler decodes a client frame
//! 2. The frame is forwarded to the joined town as a [`TownEvent`]
//! 3. The town mutates its regions and pushes encoded frames onto the
//!    outbound queues of the affected connections
//! 4. Each connection's writer task drains its queue onto the socket
//!
//! ## Error Handling
//!
//! Infrastructure failures use [`ServerError`]. Game rule violations are
//! [`CommandError`]s and are only ever reported back to the connection that
//! sent the offending command.

pub mod area;
pub mod config;
pub mod connection;
pub mod error;
pub mod motion;
pub mod player;
pub mod registry;
pub mod router;
pub mod server;
pub mod town;

pub use area::{CommandError, CommandResult, GameArea, AREA_KIND};
pub use config::ServerConfig;
pub use connection::{ConnectionHandle, ConnectionId, ConnectionManager, Room, RoomEmitter};
pub use error::ServerError;
pub use motion::MotionBroadcaster;
pub use player::TownPlayer;
pub use registry::{TownHandle, TownRegistry};
pub use router::route_command;
pub use server::TownServer;
pub use town::{Town, TownEvent};
