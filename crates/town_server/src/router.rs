//! Command routing for interactable commands.
//!
//! Every inbound [`CommandEnvelope`] ends here and always produces exactly one
//! correlated [`CommandResponse`]. Nothing raised while handling a command
//! escapes to the transport layer.

use crate::area::{CommandError, CommandResult, GameArea};
use crate::connection::RoomEmitter;
use crate::player::TownPlayer;
use game_session::GameError;
use serde_json::Value;
use town_types::{CommandEnvelope, CommandResponse, InteractableCommand};
use tracing::{debug, error};

/// Routes one command envelope to its target and builds the response.
///
/// # Arguments
///
/// * `areas` - The town's game regions
/// * `player` - The player whose connection sent the command
/// * `envelope` - The raw command envelope
/// * `room` - Emitter for any broadcasts the command triggers
///
/// # Message Flow
///
/// 1. Resolve the target: a region by id, or else a station owned by one of
///    the regions this connection has command listeners on
/// 2. An unresolved target is answered with "No such interactable"
/// 3. Decode the typed command; an undecodable body is an invalid command
/// 4. Hand the command to the region or station
///
/// Rule violations are answered with their message. Anything else is logged
/// and answered with a generic error.
pub fn route_command(
    areas: &mut [GameArea],
    player: &TownPlayer,
    envelope: &CommandEnvelope,
    room: &dyn RoomEmitter,
) -> CommandResponse {
    debug!(
        "📨 Command {} for {} from player {}",
        envelope.command_id, envelope.interactable_id, player.id
    );
    match dispatch(areas, player, envelope, room) {
        Ok(payload) => CommandResponse::ok(envelope, payload),
        Err(CommandError::Game(e)) => CommandResponse::failure(envelope, e.to_string()),
        Err(e) => {
            error!(
                "❌ Command {} on {} from player {} failed unexpectedly: {}",
                envelope.command_id, envelope.interactable_id, player.id, e
            );
            CommandResponse::failure(envelope, GameError::Unknown.to_string())
        }
    }
}

fn dispatch(
    areas: &mut [GameArea],
    player: &TownPlayer,
    envelope: &CommandEnvelope,
    room: &dyn RoomEmitter,
) -> CommandResult<Option<Value>> {
    let target = envelope.interactable_id.as_str();

    if let Some(area) = areas.iter_mut().find(|area| area.id() == target) {
        return area.handle_command(player, decode(envelope)?, room);
    }

    let station_owner = player.handle.command_listeners().into_iter().find_map(|listener| {
        areas
            .iter()
            .position(|area| area.id() == listener.area && area.has_station(target))
    });
    match station_owner {
        Some(index) => {
            areas[index].handle_station_command(player, target, decode(envelope)?, room)
        }
        None => Err(GameError::NoSuchInteractable(target.to_string()).into()),
    }
}

fn decode(envelope: &CommandEnvelope) -> CommandResult<InteractableCommand> {
    envelope
        .parse_command()
        .map_err(|_| GameError::InvalidCommand.into())
}
