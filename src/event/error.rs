use thiserror::Error;

/// Errors a bus listener can report back to the bus
///
/// The bus logs these and keeps delivering to the remaining listeners.
#[derive(Debug, Error)]
pub enum RoomEventError {
    #[error("Subscriber channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors raised when registering with the event bus
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("Listener limit of {0} reached")]
    ListenerLimit(usize),

    #[error("Event bus has been shut down")]
    Closed,
}
