// Public API
pub use connection_registry::{ConnectionRegistry, StreamTicket};
pub use handler::{room_events_handler, serve_connection, RoomEventsQuery};
pub use messages::{encode_event, ClientFrame, ServerFrame};
pub use socket::{Connection, SocketError, SocketWrapper};

// Internal modules
mod connection_registry;
mod handler;
mod messages;
mod socket;
