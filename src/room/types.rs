use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::RoomModel;

/// Room information returned by the inspection endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub room_id: String,
    pub participants: Vec<String>,
    pub participant_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<RoomModel> for RoomResponse {
    fn from(room: RoomModel) -> Self {
        Self {
            participant_count: room.participant_count(),
            room_id: room.id,
            participants: room.participants,
            created_at: room.created_at,
        }
    }
}
