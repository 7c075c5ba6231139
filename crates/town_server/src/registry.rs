//! Registry of running towns.
//!
//! Each town runs as its own task. The registry keeps a cloneable
//! [`TownHandle`] per town so connection tasks can find a town by id and
//! feed it events without holding any lock across an await.

use crate::connection::{ConnectionId, Outbound};
use crate::error::ServerError;
use crate::town::{Town, TownEvent};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use town_types::PlayerId;
use tracing::info;

/// Sending side of one town's event loop.
#[derive(Debug, Clone)]
pub struct TownHandle {
    id: String,
    friendly_name: String,
    events: mpsc::UnboundedSender<TownEvent>,
}

impl TownHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// Queues an event for the town.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Internal` if the town's event loop has stopped.
    pub fn send(&self, event: TownEvent) -> Result<(), ServerError> {
        self.events
            .send(event)
            .map_err(|_| ServerError::Internal(format!("Town {} is closed", self.id)))
    }

    /// Joins a connection to the town and waits for its player id.
    pub async fn join(
        &self,
        connection: ConnectionId,
        user_name: String,
        outbound: Outbound,
    ) -> Result<PlayerId, ServerError> {
        let (reply, joined) = oneshot::channel();
        self.send(TownEvent::Join {
            connection,
            user_name,
            outbound,
            reply,
        })?;
        joined
            .await
            .map_err(|_| ServerError::Internal(format!("Town {} closed during join", self.id)))
    }
}

/// Every town this process serves, keyed by town id.
#[derive(Debug)]
pub struct TownRegistry {
    towns: DashMap<String, TownHandle>,
    tick_interval: Duration,
    shutdown_sender: broadcast::Sender<()>,
}

impl TownRegistry {
    /// Creates an empty registry whose towns tick at `tick_interval`.
    pub fn new(tick_interval: Duration) -> Self {
        let (shutdown_sender, _) = broadcast::channel(1);
        Self {
            towns: DashMap::new(),
            tick_interval,
            shutdown_sender,
        }
    }

    /// Spawns a town's event loop and registers it.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::DuplicateTown` if a town with the same id is
    /// already registered. The town is not started in that case.
    pub fn open_town(&self, town: Town) -> Result<(TownHandle, JoinHandle<()>), ServerError> {
        match self.towns.entry(town.id().to_string()) {
            Entry::Occupied(entry) => Err(ServerError::DuplicateTown(entry.key().clone())),
            Entry::Vacant(entry) => {
                let (events, receiver) = mpsc::unbounded_channel();
                let handle = TownHandle {
                    id: town.id().to_string(),
                    friendly_name: town.friendly_name().to_string(),
                    events,
                };
                let task = tokio::spawn(town.run(
                    receiver,
                    self.tick_interval,
                    self.shutdown_sender.subscribe(),
                ));
                entry.insert(handle.clone());
                info!("📍 Registered town {} ({})", handle.id, handle.friendly_name);
                Ok((handle, task))
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<TownHandle> {
        self.towns.get(id).map(|entry| entry.value().clone())
    }

    /// Ids of all registered towns, sorted.
    pub fn town_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.towns.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.towns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towns.is_empty()
    }

    /// Stops every town's event loop and forgets them.
    pub fn shutdown(&self) {
        let _ = self.shutdown_sender.send(());
        self.towns.clear();
        info!("🛑 All towns closed");
    }
}
