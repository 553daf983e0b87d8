use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Mute state change requested by a `control` event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ControlAction {
    Mute,
    Unmute,
}

/// Events that flow through a meeting room
///
/// Events are ephemeral: built by the signaling service, published on the
/// bus, pushed to subscribers and then dropped. The JSON form keeps the
/// `type` discriminant so browser clients can switch on it directly.
///
/// `sdp` and `candidate` come straight from the browser's WebRTC stack and
/// are carried as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RoomEvent {
    /// A participant joined the room
    #[serde(rename_all = "camelCase")]
    PeerJoined { user_id: String },

    /// A participant left the room (explicitly or by disconnecting)
    #[serde(rename_all = "camelCase")]
    PeerLeft { user_id: String },

    Offer {
        from: String,
        to: String,
        sdp: serde_json::Value,
    },

    Answer {
        from: String,
        to: String,
        sdp: serde_json::Value,
    },

    Ice {
        from: String,
        to: String,
        candidate: serde_json::Value,
    },

    /// Chat line, `ts` is assigned by the server (epoch millis)
    Chat { from: String, text: String, ts: i64 },

    /// Interim speech-to-text caption
    SttText { from: String, text: String, ts: i64 },

    /// Mute/unmute command. Without a target it applies to everyone in the room.
    Control {
        from: String,
        action: ControlAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
}

impl RoomEvent {
    /// The participant this event is addressed to, if it is a directed event
    pub fn target(&self) -> Option<&str> {
        match self {
            RoomEvent::Offer { to, .. } | RoomEvent::Answer { to, .. } | RoomEvent::Ice { to, .. } => {
                Some(to)
            }
            RoomEvent::Control { target, .. } => target.as_deref(),
            RoomEvent::PeerJoined { .. }
            | RoomEvent::PeerLeft { .. }
            | RoomEvent::Chat { .. }
            | RoomEvent::SttText { .. } => None,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.target().is_some()
    }

    /// Wire name of the event kind, matches the serialized `type` field
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::PeerJoined { .. } => "peer-joined",
            RoomEvent::PeerLeft { .. } => "peer-left",
            RoomEvent::Offer { .. } => "offer",
            RoomEvent::Answer { .. } => "answer",
            RoomEvent::Ice { .. } => "ice",
            RoomEvent::Chat { .. } => "chat",
            RoomEvent::SttText { .. } => "stt-text",
            RoomEvent::Control { .. } => "control",
        }
    }
}

/// The subset of room events a participant may relay through `signal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalEvent {
    Offer {
        from: String,
        to: String,
        sdp: serde_json::Value,
    },
    Answer {
        from: String,
        to: String,
        sdp: serde_json::Value,
    },
    Ice {
        from: String,
        to: String,
        candidate: serde_json::Value,
    },
}

impl SignalEvent {
    pub fn from_user(&self) -> &str {
        match self {
            SignalEvent::Offer { from, .. }
            | SignalEvent::Answer { from, .. }
            | SignalEvent::Ice { from, .. } => from,
        }
    }

    pub fn to_user(&self) -> &str {
        match self {
            SignalEvent::Offer { to, .. }
            | SignalEvent::Answer { to, .. }
            | SignalEvent::Ice { to, .. } => to,
        }
    }
}

impl From<SignalEvent> for RoomEvent {
    fn from(event: SignalEvent) -> Self {
        match event {
            SignalEvent::Offer { from, to, sdp } => RoomEvent::Offer { from, to, sdp },
            SignalEvent::Answer { from, to, sdp } => RoomEvent::Answer { from, to, sdp },
            SignalEvent::Ice {
                from,
                to,
                candidate,
            } => RoomEvent::Ice {
                from,
                to,
                candidate,
            },
        }
    }
}

/// A room event as it travels over the bus, tagged with its room
#[derive(Debug, Clone, PartialEq)]
pub struct RoomEnvelope {
    pub room_id: String,
    pub event: RoomEvent,
}
