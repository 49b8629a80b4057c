//! WebSocket handlers
//!
//! Each page connection is wrapped in a `WsTransport` and handed to the
//! broadcast hub, which owns it until eviction.

pub mod page;
pub mod transport;

pub use transport::WsTransport;

/// How long a close handshake may block the evicting task
pub const WS_CLOSE_TIMEOUT_MS: u64 = 1000;
