//! Transport abstraction for live page connections
//!
//! The hub never talks to a socket directly. Anything that can send a text
//! frame, receive a frame, and close can be admitted to the registry.

use async_trait::async_trait;
use thiserror::Error;

/// A frame received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text frame carrying an edit payload
    Text(String),
    /// The client closed the connection (or the stream ended)
    Close,
}

/// Errors raised by a transport
///
/// These never reach HTTP callers. A send error gets the peer evicted and a
/// receive error ends the owning session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport closed")]
    Closed,

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Send timed out")]
    Timeout,
}

/// Duplex connection handle held by the registry
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one text frame to the client
    async fn send_text(&self, text: String) -> Result<(), TransportError>;

    /// Wait for the next text or close frame from the client
    ///
    /// Control and binary frames are consumed by the implementation.
    async fn receive_frame(&self) -> Result<Frame, TransportError>;

    /// Release the underlying connection
    ///
    /// The registry calls this at most once per admitted connection.
    async fn close(&self);
}
