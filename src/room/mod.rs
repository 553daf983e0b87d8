// Public API - what other modules can use
pub use handlers::{get_room, list_rooms};
pub use models::RoomModel;
pub use repository::{InMemoryRoomRepository, JoinRoomResult, LeaveRoomResult, RoomRepository};
pub use types::RoomResponse;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod types;
