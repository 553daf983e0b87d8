use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{
    bus::{EventBus, ListenerHandle},
    error::{BusError, RoomEventError},
    events::{RoomEnvelope, RoomEvent},
};

/// Lifecycle of a room subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Opening,
    Open,
    Closed,
}

/// Whether a published envelope belongs on the stream of `user_id` in `room_id`
///
/// Directed events only reach their addressee; everything else reaches
/// every subscriber of the room, including the participant who produced it.
pub fn should_deliver(envelope: &RoomEnvelope, room_id: &str, user_id: &str) -> bool {
    if envelope.room_id != room_id {
        return false;
    }

    match envelope.event.target() {
        Some(target) => target == user_id,
        None => true,
    }
}

/// One participant's filtered view of the event bus
///
/// Opening registers a bus listener that forwards matching events into an
/// unbounded channel; closing (or dropping) deregisters it. The subscription
/// never touches room membership.
pub struct RoomSubscription {
    room_id: String,
    user_id: String,
    state: SubscriptionState,
    receiver: mpsc::UnboundedReceiver<RoomEvent>,
    handle: Option<ListenerHandle>,
}

impl RoomSubscription {
    /// Opens a subscription for `user_id` on `room_id`
    pub fn open(event_bus: &EventBus, room_id: &str, user_id: &str) -> Result<Self, BusError> {
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut subscription = Self {
            room_id: room_id.to_string(),
            user_id: user_id.to_string(),
            state: SubscriptionState::Opening,
            receiver,
            handle: None,
        };

        let filter_room = subscription.room_id.clone();
        let filter_user = subscription.user_id.clone();
        let handle = event_bus.subscribe(move |envelope| {
            if !should_deliver(envelope, &filter_room, &filter_user) {
                return Ok(());
            }

            sender
                .send(envelope.event.clone())
                .map_err(|_| RoomEventError::ChannelClosed(filter_user.clone()))
        })?;

        subscription.handle = Some(handle);
        subscription.state = SubscriptionState::Open;

        info!(
            room_id = %subscription.room_id,
            user_id = %subscription.user_id,
            "Room subscription opened"
        );

        Ok(subscription)
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Waits for the next event addressed to this subscription
    ///
    /// Returns `None` once the subscription is closed and drained, or when the
    /// bus has been shut down.
    pub async fn next_event(&mut self) -> Option<RoomEvent> {
        let event = self.receiver.recv().await;
        if event.is_none() {
            self.mark_closed();
        }
        event
    }

    /// Returns an already-delivered event without waiting
    pub fn try_next_event(&mut self) -> Option<RoomEvent> {
        self.receiver.try_recv().ok()
    }

    /// Deregisters the bus listener. Events already queued can still be read.
    pub fn close(&mut self) {
        if self.state == SubscriptionState::Closed {
            return;
        }
        self.mark_closed();
    }

    fn mark_closed(&mut self) {
        if self.state == SubscriptionState::Closed {
            return;
        }

        self.handle.take();
        self.receiver.close();
        self.state = SubscriptionState::Closed;

        debug!(
            room_id = %self.room_id,
            user_id = %self.user_id,
            "Room subscription closed"
        );
    }
}

impl Stream for RoomSubscription {
    type Item = RoomEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.receiver.poll_recv(cx) {
            Poll::Ready(None) => {
                this.mark_closed();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        self.mark_closed();
    }
}
