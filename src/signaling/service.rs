use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::clock::MessageClock;
use crate::event::{ControlAction, EventBus, RoomEvent, SignalEvent};
use crate::room::repository::{JoinRoomResult, RoomRepository};
use crate::shared::AppError;

/// Longest accepted room or participant id, in characters
pub const MAX_ID_LEN: usize = 128;

/// Room ids taken by the membership routes (`/rooms/join`, `/rooms/leave`)
pub const RESERVED_ROOM_IDS: [&str; 2] = ["join", "leave"];

/// Meeting signaling operations
///
/// Every operation validates its input first and only then touches the
/// registry and the bus, so a rejected call leaves no trace. Join and leave
/// hold a membership lock across "update registry, publish", keeping the
/// order of `peer-joined`/`peer-left` events identical to membership order.
/// Chat and captions hold a message lock across "stamp, publish" so `ts`
/// reaches every subscriber in non-decreasing order.
pub struct SignalingService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
    event_bus: EventBus,
    clock: MessageClock,
    max_text_len: usize,
    membership_lock: Mutex<()>,
    message_lock: Mutex<()>,
}

impl SignalingService {
    pub fn new(
        repository: Arc<dyn RoomRepository + Send + Sync>,
        event_bus: EventBus,
        max_text_len: usize,
    ) -> Self {
        Self {
            repository,
            event_bus,
            clock: MessageClock::new(),
            max_text_len,
            membership_lock: Mutex::new(()),
            message_lock: Mutex::new(()),
        }
    }

    /// Adds `user_id` to the room and announces them
    ///
    /// Returns the other members present at the moment of the call. A repeat
    /// join leaves membership alone but still publishes `peer-joined`.
    #[instrument(skip(self))]
    pub async fn join_room(&self, room_id: &str, user_id: &str) -> Result<Vec<String>, AppError> {
        validate_room_id(room_id)?;
        validate_id("userId", user_id)?;

        let _membership = self.membership_lock.lock().await;

        let result = self.repository.join_room(room_id, user_id).await?;
        if let JoinRoomResult::AlreadyMember { .. } = result {
            debug!(room_id = %room_id, user_id = %user_id, "Repeat join, re-announcing participant");
        }

        self.event_bus.publish(
            room_id,
            RoomEvent::PeerJoined {
                user_id: user_id.to_string(),
            },
        );

        let peers = result.into_peers();
        info!(
            room_id = %room_id,
            user_id = %user_id,
            peer_count = peers.len(),
            "Participant joined meeting"
        );

        Ok(peers)
    }

    /// Removes `user_id` from the room and announces the departure
    ///
    /// Leaving a room one is not in is a silent no-op. Returns whether a
    /// `peer-left` event was published.
    #[instrument(skip(self))]
    pub async fn leave(&self, room_id: &str, user_id: &str) -> Result<bool, AppError> {
        self.leave_unless(room_id, user_id, || false).await
    }

    /// Leaves like [`SignalingService::leave`] unless `still_connected`
    /// says the participant has another live event stream
    ///
    /// The check runs under the membership lock, so it cannot interleave
    /// with a join or leave of the same room.
    #[instrument(skip(self, still_connected))]
    pub async fn leave_unless<F>(
        &self,
        room_id: &str,
        user_id: &str,
        still_connected: F,
    ) -> Result<bool, AppError>
    where
        F: FnOnce() -> bool + Send,
    {
        validate_room_id(room_id)?;
        validate_id("userId", user_id)?;

        let _membership = self.membership_lock.lock().await;

        if still_connected() {
            debug!(room_id = %room_id, user_id = %user_id, "Leave skipped, participant still connected");
            return Ok(false);
        }

        let result = self.repository.leave_room(room_id, user_id).await?;
        if !result.removed() {
            debug!(room_id = %room_id, user_id = %user_id, "Leave ignored, participant absent");
            return Ok(false);
        }

        self.event_bus.publish(
            room_id,
            RoomEvent::PeerLeft {
                user_id: user_id.to_string(),
            },
        );

        info!(room_id = %room_id, user_id = %user_id, "Participant left meeting");
        Ok(true)
    }

    /// Relays an offer, answer or ICE candidate to its addressee
    ///
    /// Membership is not checked: an event for someone who is not listening
    /// is simply never delivered.
    #[instrument(skip(self, event), fields(event_type = tracing::field::Empty))]
    pub async fn signal(&self, room_id: &str, event: SignalEvent) -> Result<(), AppError> {
        validate_room_id(room_id)?;
        validate_id("from", event.from_user())?;
        validate_id("to", event.to_user())?;

        let event = RoomEvent::from(event);
        tracing::Span::current().record("event_type", event.event_type());

        let delivered = self.event_bus.publish(room_id, event);
        debug!(room_id = %room_id, delivered = delivered, "Signal relayed");
        Ok(())
    }

    /// Broadcasts a chat line with a server-assigned timestamp
    #[instrument(skip(self, text))]
    pub async fn send_chat(
        &self,
        room_id: &str,
        from: &str,
        text: &str,
    ) -> Result<RoomEvent, AppError> {
        self.validate_message(room_id, from, text)?;

        Ok(self
            .publish_stamped(room_id, |ts| RoomEvent::Chat {
                from: from.to_string(),
                text: text.to_string(),
                ts,
            })
            .await)
    }

    /// Broadcasts a speech-to-text caption with a server-assigned timestamp
    #[instrument(skip(self, text))]
    pub async fn send_stt_text(
        &self,
        room_id: &str,
        from: &str,
        text: &str,
    ) -> Result<RoomEvent, AppError> {
        self.validate_message(room_id, from, text)?;

        Ok(self
            .publish_stamped(room_id, |ts| RoomEvent::SttText {
                from: from.to_string(),
                text: text.to_string(),
                ts,
            })
            .await)
    }

    /// Publishes a mute/unmute command, to one participant or to the room
    #[instrument(skip(self))]
    pub async fn send_control(
        &self,
        room_id: &str,
        from: &str,
        action: ControlAction,
        target: Option<&str>,
    ) -> Result<RoomEvent, AppError> {
        validate_room_id(room_id)?;
        validate_id("from", from)?;
        if let Some(target) = target {
            validate_id("target", target)?;
        }

        let event = RoomEvent::Control {
            from: from.to_string(),
            action,
            target: target.map(str::to_string),
        };
        self.event_bus.publish(room_id, event.clone());

        info!(room_id = %room_id, from = %from, action = %action, "Control command published");
        Ok(event)
    }

    async fn publish_stamped<F>(&self, room_id: &str, build: F) -> RoomEvent
    where
        F: FnOnce(i64) -> RoomEvent,
    {
        let _ordering = self.message_lock.lock().await;

        let event = build(self.clock.now_millis());
        self.event_bus.publish(room_id, event.clone());
        event
    }

    fn validate_message(&self, room_id: &str, from: &str, text: &str) -> Result<(), AppError> {
        validate_room_id(room_id)?;
        validate_id("from", from)?;

        if text.trim().is_empty() {
            return Err(AppError::Validation("text must not be empty".to_string()));
        }
        if text.chars().count() > self.max_text_len {
            return Err(AppError::Validation(format!(
                "text must be at most {} characters",
                self.max_text_len
            )));
        }
        Ok(())
    }
}

/// Checks a room id, which must also not collide with a membership route
pub fn validate_room_id(room_id: &str) -> Result<(), AppError> {
    validate_id("roomId", room_id)?;
    if RESERVED_ROOM_IDS.contains(&room_id) {
        return Err(AppError::Validation(format!(
            "roomId '{}' is reserved",
            room_id
        )));
    }
    Ok(())
}

pub fn validate_id(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_ID_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_ID_LEN
        )));
    }
    Ok(())
}
