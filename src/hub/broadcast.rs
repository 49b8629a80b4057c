//! Broadcast hub
//!
//! Fans join announcements, presence counts and relayed edits out to the
//! connections viewing the same page. Every fan-out works on a snapshot of
//! the room; peers whose send fails or times out are evicted afterwards and
//! the rest of the fan-out is unaffected.

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::message::HubMessage;
use super::registry::{ConnectionEntry, ConnectionId, ConnectionRegistry};
use super::transport::{Transport, TransportError};
use crate::config::HubConfig;

/// Room-scoped notification hub
///
/// Constructed once at startup and shared through `AppState`.
pub struct BroadcastHub {
    registry: ConnectionRegistry,
    config: HubConfig,
}

impl BroadcastHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            config,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn admit(&self, transport: Arc<dyn Transport>, room: impl Into<String>) -> ConnectionId {
        self.registry.admit(transport, room)
    }

    /// Announce a freshly admitted connection to its room
    ///
    /// Every other viewer gets a join announcement, then the whole room
    /// (including the new connection) gets the presence count. Returns the
    /// count, or `None` if `id` is no longer registered.
    pub async fn notify_join(&self, id: ConnectionId) -> Option<usize> {
        let entry = self.registry.lookup(id)?;
        let peers = self.peers_of(&entry);
        let count = peers.len() + 1;

        self.fan_out(&peers, &HubMessage::Join).await;
        self.broadcast_presence(id, count).await;

        info!(connection_id = %id, room = %entry.room, count, "Viewer joined page");
        Some(count)
    }

    /// Forward an edit payload to every other viewer of the sender's page
    ///
    /// Returns the number of peers the frame was delivered to.
    pub async fn relay(&self, id: ConnectionId, payload: impl Into<String>) -> usize {
        let Some(entry) = self.registry.lookup(id) else {
            return 0;
        };
        let peers = self.peers_of(&entry);

        self.fan_out(&peers, &HubMessage::Relay(payload.into())).await
    }

    /// Send `count` to every viewer in `id`'s room, `id` included
    pub async fn broadcast_presence(&self, id: ConnectionId, count: usize) -> usize {
        let Some(entry) = self.registry.lookup(id) else {
            return 0;
        };

        self.presence_to_room(&entry.room, count).await
    }

    /// Evict a connection whose own session ended
    ///
    /// Survivors only get a fresh presence count when `presence_on_leave`
    /// is enabled; by default the count is refreshed on the next join.
    pub async fn leave(&self, id: ConnectionId) -> bool {
        let Some(entry) = self.registry.lookup(id) else {
            return false;
        };
        if !self.registry.evict(id).await {
            return false;
        }

        if self.config.presence_on_leave {
            let count = self.registry.room_count(&entry.room);
            if count > 0 {
                self.presence_to_room(&entry.room, count).await;
            }
        }

        true
    }

    /// Close every live connection and clear the registry
    pub async fn shutdown(&self) -> usize {
        let entries = self.registry.drain();
        join_all(entries.iter().map(|entry| entry.transport.close())).await;

        info!(connections = entries.len(), "Broadcast hub shut down");
        entries.len()
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub fn room_count(&self, room: &str) -> usize {
        self.registry.room_count(room)
    }

    fn peers_of(&self, entry: &ConnectionEntry) -> Vec<ConnectionEntry> {
        self.registry
            .room_snapshot(&entry.room)
            .into_iter()
            .filter(|peer| peer.id != entry.id)
            .collect()
    }

    async fn presence_to_room(&self, room: &str, count: usize) -> usize {
        let members = self.registry.room_snapshot(room);
        self.fan_out(&members, &HubMessage::Presence(count)).await
    }

    async fn fan_out(&self, targets: &[ConnectionEntry], message: &HubMessage) -> usize {
        if targets.is_empty() {
            return 0;
        }

        let frame = message.to_frame();
        let send_timeout = self.config.send_timeout;

        let results = join_all(targets.iter().map(|entry| {
            let frame = frame.clone();
            async move {
                let result = match timeout(send_timeout, entry.transport.send_text(frame)).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout),
                };
                (entry.id, result)
            }
        }))
        .await;

        let mut delivered = 0;
        for (id, result) in results {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        connection_id = %id,
                        frame = message.tag(),
                        error = %e,
                        "Send to peer failed, evicting"
                    );
                    self.registry.evict(id).await;
                }
            }
        }

        debug!(frame = message.tag(), targets = targets.len(), delivered, "Fan-out complete");
        delivered
    }
}
