use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// In-memory state of one meeting room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomModel {
    pub id: String,
    /// Participant ids in join order, without duplicates
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl RoomModel {
    /// Creates an empty room; participants are added as they join
    pub fn new(id: String) -> Self {
        Self {
            id,
            participants: vec![],
            created_at: Utc::now(),
        }
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// Adds a participant; returns false if they were already a member
    pub fn add_participant(&mut self, user_id: &str) -> bool {
        if self.has_participant(user_id) {
            return false;
        }
        self.participants.push(user_id.to_string());
        true
    }

    /// Removes a participant; returns false if they were not a member
    pub fn remove_participant(&mut self, user_id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p != user_id);
        self.participants.len() != before
    }

    /// Everyone in the room except `user_id`, in join order
    pub fn peers_of(&self, user_id: &str) -> Vec<String> {
        self.participants
            .iter()
            .filter(|p| p.as_str() != user_id)
            .cloned()
            .collect()
    }
}
