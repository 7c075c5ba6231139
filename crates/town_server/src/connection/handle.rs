//! Per-connection listener registration.
//!
//! A [`ConnectionHandle`] is the only way game code attaches behaviour to a
//! connection. Registration is typed: movement, command and disconnect
//! listeners each have their own method and their own route type naming the
//! game region that should receive the event.
//!
//! Every registration returns a [`Subscription`]. Dropping the subscription
//! removes the listener. When the connection itself goes away the listener
//! table goes with it, and any subscriptions still held elsewhere become inert.

use super::ConnectionId;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Routes in-game movement from this connection to a region's broadcaster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveListener {
    pub area: String,
}

/// Routes station commands from this connection to a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandListener {
    pub area: String,
}

/// Tells a region when this connection closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectListener {
    pub area: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerKind {
    Move,
    Command,
    Disconnect,
}

#[derive(Debug, Default)]
struct Listeners {
    next_token: u64,
    moves: Vec<(u64, MoveListener)>,
    commands: Vec<(u64, CommandListener)>,
    disconnects: Vec<(u64, DisconnectListener)>,
}

impl Listeners {
    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn remove(&mut self, kind: ListenerKind, token: u64) {
        match kind {
            ListenerKind::Move => self.moves.retain(|(t, _)| *t != token),
            ListenerKind::Command => self.commands.retain(|(t, _)| *t != token),
            ListenerKind::Disconnect => self.disconnects.retain(|(t, _)| *t != token),
        }
    }
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Typed listener registry for one connection.
///
/// Cloning the handle shares the same listener table.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    connection: ConnectionId,
    listeners: Arc<Mutex<Listeners>>,
}

impl ConnectionHandle {
    pub fn new(connection: ConnectionId) -> Self {
        Self {
            connection,
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection
    }

    /// Registers a movement route. Dropping the returned subscription removes it.
    pub fn on_move(&self, listener: MoveListener) -> Subscription {
        let mut table = lock(&self.listeners);
        let token = table.token();
        table.moves.push((token, listener));
        self.subscription(ListenerKind::Move, token)
    }

    /// Registers a command route. Dropping the returned subscription removes it.
    pub fn on_command(&self, listener: CommandListener) -> Subscription {
        let mut table = lock(&self.listeners);
        let token = table.token();
        table.commands.push((token, listener));
        self.subscription(ListenerKind::Command, token)
    }

    /// Registers a disconnect route. Dropping the returned subscription removes it.
    pub fn on_disconnect(&self, listener: DisconnectListener) -> Subscription {
        let mut table = lock(&self.listeners);
        let token = table.token();
        table.disconnects.push((token, listener));
        self.subscription(ListenerKind::Disconnect, token)
    }

    pub fn move_listeners(&self) -> Vec<MoveListener> {
        lock(&self.listeners)
            .moves
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub fn command_listeners(&self) -> Vec<CommandListener> {
        lock(&self.listeners)
            .commands
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub fn disconnect_listeners(&self) -> Vec<DisconnectListener> {
        lock(&self.listeners)
            .disconnects
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    /// Total number of live registrations of every kind.
    pub fn listener_count(&self) -> usize {
        let table = lock(&self.listeners);
        table.moves.len() + table.commands.len() + table.disconnects.len()
    }

    fn subscription(&self, kind: ListenerKind, token: u64) -> Subscription {
        Subscription {
            listeners: Arc::downgrade(&self.listeners),
            kind,
            token,
        }
    }
}

/// Keeps one listener registered for as long as it lives.
#[derive(Debug)]
#[must_use = "dropping a subscription immediately deregisters its listener"]
pub struct Subscription {
    listeners: Weak<Mutex<Listeners>>,
    kind: ListenerKind,
    token: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).remove(self.kind, self.token);
        }
    }
}
