use std::collections::HashMap;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::messages::Message;

pub type ConnectionId = Uuid;
pub type EventSender = mpsc::Sender<PresenceEvent>;
pub type EventReceiver = mpsc::Receiver<PresenceEvent>;

/// Events queued per connection before further pushes to it are dropped.
pub const PUSH_QUEUE_CAPACITY: usize = 64;

/// What gets pushed down a live connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum PresenceEvent {
    #[serde(rename = "newMessage")]
    NewMessage(Message),
    #[serde(rename = "getOnlineUser")]
    OnlineUsers(Vec<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
    #[error("connection {0} has gone away")]
    Closed(ConnectionId),
    #[error("connection {0} is not keeping up, event dropped")]
    Full(ConnectionId),
}

impl PushError {
    fn from_try_send<T>(connection_id: ConnectionId, err: TrySendError<T>) -> Self {
        match err {
            TrySendError::Full(_) => Self::Full(connection_id),
            TrySendError::Closed(_) => Self::Closed(connection_id),
        }
    }
}

struct Connection {
    user_id: String,
    tx: EventSender,
}

#[derive(Default)]
struct Registry {
    users: HashMap<String, ConnectionId>,
    connections: HashMap<ConnectionId, Connection>,
}

impl Registry {
    fn online_users(&self) -> Vec<String> {
        let mut online: Vec<String> = self.users.keys().cloned().collect();
        online.sort();
        online
    }

    fn broadcast(&self, event: &PresenceEvent) {
        for (connection_id, connection) in &self.connections {
            if let Err(err) = connection.tx.try_send(event.clone()) {
                let err = PushError::from_try_send(*connection_id, err);
                trace!(error = %err, "online set not delivered");
            }
        }
    }
}

/// Which users hold a live push channel, and how to reach them.
///
/// One instance per process, shared through the app state. A user maps to at
/// most one connection; a later registration replaces an earlier one. Every
/// open connection still receives online-set broadcasts until it unregisters.
#[derive(Default)]
pub struct PresenceRegistry {
    inner: RwLock<Registry>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh channel for `user_id` and registers it.
    pub fn connect(&self, user_id: &str) -> (ConnectionId, EventReceiver) {
        let (tx, rx) = mpsc::channel(PUSH_QUEUE_CAPACITY);
        let connection_id = Uuid::now_v7();
        self.register(user_id, connection_id, tx);
        (connection_id, rx)
    }

    pub fn register(&self, user_id: &str, connection_id: ConnectionId, tx: EventSender) {
        let mut inner = self.inner.write();
        inner.connections.insert(
            connection_id,
            Connection { user_id: user_id.to_owned(), tx },
        );
        if let Some(previous) = inner.users.insert(user_id.to_owned(), connection_id) {
            if previous != connection_id {
                debug!(user_id, %previous, %connection_id, "replacing presence entry");
            }
        }

        // broadcast under the lock so online sets arrive in mutation order
        let online = inner.online_users();
        inner.broadcast(&PresenceEvent::OnlineUsers(online));
    }

    /// Drops `connection_id`. Returns the user it belonged to, if it was known.
    pub fn unregister(&self, connection_id: ConnectionId) -> Option<String> {
        let mut inner = self.inner.write();
        let Connection { user_id, .. } = inner.connections.remove(&connection_id)?;

        // a newer connection for the same user stays put
        if inner.users.get(&user_id) == Some(&connection_id) {
            inner.users.remove(&user_id);
        }

        let online = inner.online_users();
        inner.broadcast(&PresenceEvent::OnlineUsers(online));
        Some(user_id)
    }

    pub fn lookup(&self, user_id: &str) -> Option<ConnectionId> {
        self.inner.read().users.get(user_id).copied()
    }

    pub fn online_users(&self) -> Vec<String> {
        self.inner.read().online_users()
    }

    /// Queues `event` on one connection without waiting for the socket.
    /// A connection whose queue is full loses the event.
    pub fn push(&self, connection_id: ConnectionId, event: PresenceEvent) -> Result<(), PushError> {
        let inner = self.inner.read();
        let connection = inner
            .connections
            .get(&connection_id)
            .ok_or(PushError::UnknownConnection(connection_id))?;
        connection
            .tx
            .try_send(event)
            .map_err(|err| PushError::from_try_send(connection_id, err))
    }
}
