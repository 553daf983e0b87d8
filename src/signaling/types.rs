use serde::{Deserialize, Serialize};

use crate::event::{ControlAction, SignalEvent};

/// Request payload for joining (or leaving) a meeting room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub room_id: String,
    pub user_id: String,
}

/// Response for a successful join: who was already in the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub peers: Vec<String>,
}

/// Request payload for relaying an offer, answer or ICE candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRequest {
    pub room_id: String,
    pub event: SignalEvent,
}

/// Request payload for chat and speech-to-text messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageRequest {
    pub room_id: String,
    pub from: String,
    pub text: String,
}

/// Request payload for mute/unmute commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRequest {
    pub room_id: String,
    pub from: String,
    pub action: ControlAction,
    #[serde(default)]
    pub target: Option<String>,
}

/// Acknowledgement returned by mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
