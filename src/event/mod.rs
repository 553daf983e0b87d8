// Event-driven core of the meeting hub
//
// The bus carries every room event published by the signaling service;
// room subscriptions filter it down to what one participant should see.

// Public API - what other modules can use
pub use bus::{EventBus, ListenerHandle, DEFAULT_MAX_LISTENERS};
pub use error::{BusError, RoomEventError};
pub use events::{ControlAction, RoomEnvelope, RoomEvent, SignalEvent};
pub use room_subscription::{should_deliver, RoomSubscription, SubscriptionState};

// Internal modules
mod bus;
mod error;
mod events;
mod room_subscription;
