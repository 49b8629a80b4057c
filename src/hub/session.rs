//! Per-connection session loop

use std::sync::Arc;

use tracing::{debug, info};

use super::broadcast::BroadcastHub;
use super::registry::ConnectionId;
use super::transport::{Frame, Transport};

impl BroadcastHub {
    /// Drive one page connection from admission to eviction
    ///
    /// Admits the transport, announces it, then relays each text frame to the
    /// rest of the room until the client closes, a read fails, or a peer
    /// fan-out has already evicted this connection.
    pub async fn run_session(
        &self,
        transport: Arc<dyn Transport>,
        room: impl Into<String>,
    ) -> ConnectionId {
        let room = room.into();
        let id = self.admit(transport.clone(), room.clone());
        info!(connection_id = %id, room = %room, "Page connection opened");

        self.notify_join(id).await;

        loop {
            if !self.registry().contains(id) {
                debug!(connection_id = %id, "Connection evicted during fan-out");
                break;
            }

            match transport.receive_frame().await {
                Ok(Frame::Text(payload)) => {
                    debug!(connection_id = %id, bytes = payload.len(), "Relaying edit");
                    self.relay(id, payload).await;
                }
                Ok(Frame::Close) => {
                    info!(connection_id = %id, "Page connection closed by client");
                    break;
                }
                Err(e) => {
                    info!(connection_id = %id, error = %e, "Page connection read failed");
                    break;
                }
            }
        }

        self.leave(id).await;
        info!(connection_id = %id, room = %room, "Page connection ended");
        id
    }
}
