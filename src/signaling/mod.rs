// Public API - what other modules can use
pub use handlers::{join_room, leave_room, send_chat, send_control, send_stt_text, signal};
pub use service::{
    validate_id, validate_room_id, SignalingService, MAX_ID_LEN, RESERVED_ROOM_IDS,
};
pub use types::{
    ControlRequest, JoinRoomResponse, MembershipRequest, OkResponse, SignalRequest,
    TextMessageRequest,
};

// Internal modules
mod clock;
mod handlers;
mod service;
mod types;
