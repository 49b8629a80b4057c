//! Live page presence and edit relay
//!
//! Tracks which connections are viewing which page and fans notifications
//! out to the viewers of the same page.

mod broadcast;
mod message;
mod registry;
mod session;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcast::BroadcastHub;
pub use message::HubMessage;
pub use registry::{ConnectionEntry, ConnectionId, ConnectionRegistry};
pub use transport::{Frame, Transport, TransportError};
