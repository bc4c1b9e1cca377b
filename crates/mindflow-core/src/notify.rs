//! Per-user live connections and event fan-out.
//!
//! Each user has at most one registered connection. A connection is the
//! sending half of an unbounded channel; whoever owns the socket drains the
//! receiving half. Sending never blocks, so broadcasting is safe from inside
//! a request handler.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::events::{Event, EventEnvelope};
use crate::UserId;

/// Outbound half of one live connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: Uuid,
    sender: UnboundedSender<String>,
}

impl ConnectionHandle {
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// False once the receiving side has been dropped.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queue a text frame. Returns false if the connection is gone.
    pub fn send(&self, text: String) -> bool {
        self.sender.send(text).is_ok()
    }
}

/// Outcome of a single broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No connection registered for the user.
    NoChannel,
    /// A connection is registered but its socket has gone away.
    ChannelClosed,
    /// The event could not be serialized.
    Failed,
}

/// Map of user id to the user's live connection. Last registration wins.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<UserId, ConnectionHandle>> {
        self.connections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<UserId, ConnectionHandle>> {
        self.connections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Track `handle` as the user's connection, returning the one it replaced.
    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let displaced = self.write().insert(user_id, handle);
        if let Some(old) = &displaced {
            tracing::debug!(user_id, connection = %old.id(), "replaced live connection");
        }
        displaced
    }

    /// Forget the user's connection if it is still `connection_id`.
    ///
    /// A stale socket closing after the user reconnected leaves the newer
    /// registration in place.
    pub fn unregister(&self, user_id: UserId, connection_id: Uuid) -> bool {
        let mut connections = self.write();
        match connections.get(&user_id) {
            Some(current) if current.id() == connection_id => {
                connections.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    pub fn is_connected(&self, user_id: UserId) -> bool {
        self.read().get(&user_id).is_some_and(ConnectionHandle::is_open)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn handle_for(&self, user_id: UserId) -> Option<ConnectionHandle> {
        self.read().get(&user_id).cloned()
    }
}

/// Delivers events to the owning user's connection.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl EventBroadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Send `event` to `user_id` if they are connected. Misses are dropped.
    pub fn broadcast(&self, user_id: UserId, event: &Event) -> Delivery {
        let Some(handle) = self.registry.handle_for(user_id) else {
            tracing::debug!(user_id, kind = event.kind(), "no live connection, event dropped");
            return Delivery::NoChannel;
        };
        if !handle.is_open() {
            tracing::debug!(user_id, kind = event.kind(), "connection closed, event dropped");
            return Delivery::ChannelClosed;
        }

        let frame = match EventEnvelope::new(event, Utc::now()).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(user_id, kind = event.kind(), error = %e, "failed to encode event");
                return Delivery::Failed;
            }
        };

        if handle.send(frame) {
            Delivery::Sent
        } else {
            tracing::debug!(user_id, kind = event.kind(), "connection closed, event dropped");
            Delivery::ChannelClosed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn setup() -> (Arc<ConnectionRegistry>, EventBroadcaster) {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = EventBroadcaster::new(Arc::clone(&registry));
        (registry, broadcaster)
    }

    #[test]
    fn broadcast_without_connection_is_a_silent_miss() {
        let (_registry, broadcaster) = setup();
        let outcome = broadcaster.broadcast(5, &Event::TaskDeleted { id: 1 });
        assert_eq!(outcome, Delivery::NoChannel);
    }

    #[test]
    fn broadcast_reaches_registered_user() {
        let (registry, broadcaster) = setup();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(1, ConnectionHandle::new(tx));

        assert_eq!(
            broadcaster.broadcast(1, &Event::TaskDeleted { id: 8 }),
            Delivery::Sent
        );
        let frame: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame["type"], "TASK_DELETED");
        assert_eq!(frame["payload"]["id"], 8);
        assert!(frame["timestamp"].is_string());
    }

    #[test]
    fn events_only_reach_their_owner() {
        let (registry, broadcaster) = setup();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(1, ConnectionHandle::new(tx));

        assert_eq!(
            broadcaster.broadcast(2, &Event::TaskDeleted { id: 8 }),
            Delivery::NoChannel
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_channel_is_reported() {
        let (registry, broadcaster) = setup();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(1, ConnectionHandle::new(tx));
        drop(rx);

        assert!(!registry.is_connected(1));
        assert_eq!(
            broadcaster.broadcast(1, &Event::TaskDeleted { id: 8 }),
            Delivery::ChannelClosed
        );
    }

    #[test]
    fn last_registration_wins_and_returns_displaced() {
        let (registry, broadcaster) = setup();
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        let old = ConnectionHandle::new(old_tx);
        let old_id = old.id();

        assert!(registry.register(1, old).is_none());
        let displaced = registry.register(1, ConnectionHandle::new(new_tx));
        assert_eq!(displaced.map(|h| h.id()), Some(old_id));
        assert_eq!(registry.len(), 1);

        broadcaster.broadcast(1, &Event::TaskDeleted { id: 3 });
        assert!(new_rx.try_recv().is_ok());
        assert!(old_rx.try_recv().is_err());
    }

    #[test]
    fn stale_unregister_keeps_newer_connection() {
        let (registry, _broadcaster) = setup();
        let (old_tx, _old_rx) = mpsc::unbounded_channel();
        let (new_tx, _new_rx) = mpsc::unbounded_channel();
        let old = ConnectionHandle::new(old_tx);
        let old_id = old.id();
        let new = ConnectionHandle::new(new_tx);
        let new_id = new.id();

        registry.register(1, old);
        registry.register(1, new);

        assert!(!registry.unregister(1, old_id));
        assert!(registry.is_connected(1));
        assert!(registry.unregister(1, new_id));
        assert!(registry.is_empty());
    }
}
