//! Frames pushed from the hub to page viewers
//!
//! Each frame is a single text message made of a tag, a colon, and an
//! optional payload.

use std::fmt;

const JOIN_TAG: &str = "NewConnection";
const PRESENCE_TAG: &str = "Connections";
const RELAY_TAG: &str = "Message";

/// Notification sent to clients viewing a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubMessage {
    /// Another viewer opened the page
    Join,
    /// Number of viewers currently on the page
    Presence(usize),
    /// An edit relayed verbatim from another viewer
    Relay(String),
}

impl HubMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            HubMessage::Join => JOIN_TAG,
            HubMessage::Presence(_) => PRESENCE_TAG,
            HubMessage::Relay(_) => RELAY_TAG,
        }
    }

    /// Encode as the text frame written to the wire
    pub fn to_frame(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HubMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubMessage::Join => write!(f, "{}:", JOIN_TAG),
            HubMessage::Presence(count) => write!(f, "{}:{}", PRESENCE_TAG, count),
            HubMessage::Relay(payload) => write!(f, "{}:{}", RELAY_TAG, payload),
        }
    }
}
