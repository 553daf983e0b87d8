// Library crate for the meeting signaling hub
// This file exposes the public API for the binary and integration tests

pub mod app;
pub mod config;
pub mod event;
pub mod room;
pub mod shared;
pub mod signaling;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use config::ServerConfig;
pub use event::{ControlAction, EventBus, RoomEvent, RoomSubscription, SignalEvent};
pub use room::{models::RoomModel, repository::RoomRepository};
pub use shared::{AppError, AppState};
pub use signaling::SignalingService;
