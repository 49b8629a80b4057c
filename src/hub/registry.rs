//! Connection registry
//!
//! Tracks every live page connection, keyed by a random identity and grouped
//! by the page title (room) it was opened on. All access goes through one
//! mutex; the lock is never held across an await.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::transport::Transport;

/// Identity assigned to a connection at admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One admitted connection
#[derive(Clone)]
pub struct ConnectionEntry {
    pub id: ConnectionId,
    pub room: String,
    pub transport: Arc<dyn Transport>,
}

impl fmt::Debug for ConnectionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionEntry")
            .field("id", &self.id)
            .field("room", &self.room)
            .finish_non_exhaustive()
    }
}

/// Registry of live connections
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Admit a connection to a room and return its identity
    pub fn admit(&self, transport: Arc<dyn Transport>, room: impl Into<String>) -> ConnectionId {
        let room = room.into();
        let mut entries = self.entries.lock();

        // v4 collisions are not expected, but a live key must never be reused
        let mut id = ConnectionId::new();
        while entries.contains_key(&id) {
            id = ConnectionId::new();
        }

        entries.insert(
            id,
            ConnectionEntry {
                id,
                room: room.clone(),
                transport,
            },
        );

        debug!(connection_id = %id, room = %room, "Admitted connection");
        id
    }

    /// Remove a connection and close its transport
    ///
    /// Returns `false` if the identity was not registered. Only the caller
    /// that removes the entry closes the transport, so it is closed once.
    pub async fn evict(&self, id: ConnectionId) -> bool {
        let removed = self.entries.lock().remove(&id);

        match removed {
            Some(entry) => {
                entry.transport.close().await;
                debug!(connection_id = %id, room = %entry.room, "Evicted connection");
                true
            }
            None => false,
        }
    }

    pub fn lookup(&self, id: ConnectionId) -> Option<ConnectionEntry> {
        self.entries.lock().get(&id).cloned()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.lock().contains_key(&id)
    }

    /// Entries currently in `room`, copied out under the lock
    pub fn room_snapshot(&self, room: &str) -> Vec<ConnectionEntry> {
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.room == room)
            .cloned()
            .collect()
    }

    /// Apply `f` to every entry in `room`
    ///
    /// Runs over a snapshot, so `f` may call back into the registry.
    pub fn for_each_in_room<F>(&self, room: &str, mut f: F)
    where
        F: FnMut(&ConnectionEntry),
    {
        for entry in self.room_snapshot(room) {
            f(&entry);
        }
    }

    pub fn room_count(&self, room: &str) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.room == room)
            .count()
    }

    /// Number of distinct rooms with at least one live connection
    pub fn active_rooms(&self) -> usize {
        let entries = self.entries.lock();
        let mut rooms: Vec<&str> = entries.values().map(|e| e.room.as_str()).collect();
        rooms.sort_unstable();
        rooms.dedup();
        rooms.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove every entry without closing transports
    pub fn drain(&self) -> Vec<ConnectionEntry> {
        self.entries.lock().drain().map(|(_, entry)| entry).collect()
    }
}
