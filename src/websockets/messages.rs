use serde::{Deserialize, Serialize};

use crate::event::RoomEvent;

/// Frames a client may send over its event stream
///
/// Browsers cannot send WebSocket ping frames from script, so keepalive is
/// done at the application level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    Ping,
}

/// Frames the server sends besides room events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerFrame {
    Pong,
}

/// Encodes a room event as a text frame
pub fn encode_event(event: &RoomEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}
