use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::models::RoomModel;
use crate::shared::AppError;

/// Result of adding a participant to a room
#[derive(Debug, Clone, PartialEq)]
pub enum JoinRoomResult {
    /// The participant was added; `peers` are the members present before them
    Joined { peers: Vec<String>, room_created: bool },
    /// The participant was already a member; membership is unchanged
    AlreadyMember { peers: Vec<String> },
}

impl JoinRoomResult {
    /// Other members of the room at the moment of the join
    pub fn peers(&self) -> &[String] {
        match self {
            JoinRoomResult::Joined { peers, .. } | JoinRoomResult::AlreadyMember { peers } => peers,
        }
    }

    pub fn into_peers(self) -> Vec<String> {
        match self {
            JoinRoomResult::Joined { peers, .. } | JoinRoomResult::AlreadyMember { peers } => peers,
        }
    }
}

/// Result of removing a participant from a room
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveRoomResult {
    /// Participant removed, returns the updated room
    Left(RoomModel),
    /// Participant removed and the room, now empty, was deleted
    RoomDeleted,
    /// Participant was not in the room
    ParticipantNotInRoom,
    /// Room does not exist
    RoomNotFound,
}

impl LeaveRoomResult {
    /// Whether membership actually changed
    pub fn removed(&self) -> bool {
        matches!(self, LeaveRoomResult::Left(_) | LeaveRoomResult::RoomDeleted)
    }
}

/// Room registry: room id to the set of joined participants
#[async_trait]
pub trait RoomRepository {
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError>;
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError>;

    /// Atomically adds a participant, creating the room on first join
    async fn join_room(&self, room_id: &str, user_id: &str) -> Result<JoinRoomResult, AppError>;

    /// Atomically removes a participant, deleting the room once it is empty
    async fn leave_room(&self, room_id: &str, user_id: &str)
        -> Result<LeaveRoomResult, AppError>;
}

/// In-memory implementation of RoomRepository
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<String, RoomModel>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self))]
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError> {
        let rooms = self.rooms.read().await;
        let room = rooms.get(room_id).cloned();

        match &room {
            Some(r) => debug!(
                room_id = %room_id,
                participants = r.participant_count(),
                "Room found in memory"
            ),
            None => debug!(room_id = %room_id, "Room not found in memory"),
        }

        Ok(room)
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let rooms = self.rooms.read().await;
        let mut room_list: Vec<RoomModel> = rooms.values().cloned().collect();
        room_list.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(room_count = room_list.len(), "Rooms listed from memory");
        Ok(room_list)
    }

    #[instrument(skip(self))]
    async fn join_room(&self, room_id: &str, user_id: &str) -> Result<JoinRoomResult, AppError> {
        let mut rooms = self.rooms.write().await;

        let room_created = !rooms.contains_key(room_id);
        let room = rooms
            .entry(room_id.to_string())
            .or_insert_with(|| RoomModel::new(room_id.to_string()));

        let peers = room.peers_of(user_id);

        if !room.add_participant(user_id) {
            debug!(room_id = %room_id, user_id = %user_id, "Participant already in room");
            return Ok(JoinRoomResult::AlreadyMember { peers });
        }

        info!(
            room_id = %room_id,
            user_id = %user_id,
            participants = room.participant_count(),
            room_created = room_created,
            "Participant joined room"
        );

        Ok(JoinRoomResult::Joined {
            peers,
            room_created,
        })
    }

    #[instrument(skip(self))]
    async fn leave_room(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<LeaveRoomResult, AppError> {
        let mut rooms = self.rooms.write().await;

        let room = match rooms.get_mut(room_id) {
            Some(room) => room,
            None => {
                debug!(room_id = %room_id, "Room not found");
                return Ok(LeaveRoomResult::RoomNotFound);
            }
        };

        if !room.remove_participant(user_id) {
            debug!(room_id = %room_id, user_id = %user_id, "Participant not in room");
            return Ok(LeaveRoomResult::ParticipantNotInRoom);
        }

        if room.is_empty() {
            info!(room_id = %room_id, "Room is now empty, deleting");
            rooms.remove(room_id);
            return Ok(LeaveRoomResult::RoomDeleted);
        }

        info!(
            room_id = %room_id,
            user_id = %user_id,
            participants = room.participant_count(),
            "Participant left room"
        );

        Ok(LeaveRoomResult::Left(room.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_join_creates_room_with_no_peers() {
        let repo = InMemoryRoomRepository::new();

        let result = repo.join_room("standup", "alice").await.unwrap();

        assert_eq!(
            result,
            JoinRoomResult::Joined {
                peers: vec![],
                room_created: true
            }
        );
        let room = repo.get_room("standup").await.unwrap().unwrap();
        assert_eq!(room.participants, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_join_returns_snapshot_of_other_members() {
        let repo = InMemoryRoomRepository::new();
        repo.join_room("standup", "alice").await.unwrap();
        repo.join_room("standup", "bob").await.unwrap();

        let result = repo.join_room("standup", "carol").await.unwrap();

        assert_eq!(result.peers(), ["alice".to_string(), "bob".to_string()]);
        assert!(matches!(
            result,
            JoinRoomResult::Joined {
                room_created: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_rejoin_coalesces_membership() {
        let repo = InMemoryRoomRepository::new();
        repo.join_room("standup", "alice").await.unwrap();
        repo.join_room("standup", "bob").await.unwrap();

        let result = repo.join_room("standup", "alice").await.unwrap();

        assert_eq!(
            result,
            JoinRoomResult::AlreadyMember {
                peers: vec!["bob".to_string()]
            }
        );
        let room = repo.get_room("standup").await.unwrap().unwrap();
        assert_eq!(room.participant_count(), 2);
    }

    #[tokio::test]
    async fn test_leave_keeps_room_while_members_remain() {
        let repo = InMemoryRoomRepository::new();
        repo.join_room("standup", "alice").await.unwrap();
        repo.join_room("standup", "bob").await.unwrap();

        let result = repo.leave_room("standup", "alice").await.unwrap();

        match result {
            LeaveRoomResult::Left(room) => assert_eq!(room.participants, vec!["bob"]),
            other => panic!("unexpected leave result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_last_leave_deletes_room() {
        let repo = InMemoryRoomRepository::new();
        repo.join_room("standup", "alice").await.unwrap();

        let result = repo.leave_room("standup", "alice").await.unwrap();

        assert_eq!(result, LeaveRoomResult::RoomDeleted);
        assert!(repo.get_room("standup").await.unwrap().is_none());
        assert!(repo.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_leave_when_absent_is_harmless() {
        let repo = InMemoryRoomRepository::new();
        assert_eq!(
            repo.leave_room("standup", "alice").await.unwrap(),
            LeaveRoomResult::RoomNotFound
        );

        repo.join_room("standup", "bob").await.unwrap();
        let result = repo.leave_room("standup", "alice").await.unwrap();
        assert_eq!(result, LeaveRoomResult::ParticipantNotInRoom);
        assert!(!result.removed());
    }

    #[tokio::test]
    async fn test_list_rooms_sorted_by_id() {
        let repo = InMemoryRoomRepository::new();
        repo.join_room("retro", "alice").await.unwrap();
        repo.join_room("standup", "bob").await.unwrap();
        repo.join_room("planning", "carol").await.unwrap();

        let ids: Vec<String> = repo
            .list_rooms()
            .await
            .unwrap()
            .into_iter()
            .map(|room| room.id)
            .collect();

        assert_eq!(ids, vec!["planning", "retro", "standup"]);
    }
}
