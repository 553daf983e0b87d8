use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

type StreamKey = (String, String);

/// Counts open event streams per (room, participant)
///
/// A participant may hold several streams at once, e.g. a second tab or a
/// reconnect racing the close of the stale socket.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    // (room_id, user_id) -> open streams
    streams: Arc<Mutex<HashMap<StreamKey, usize>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new stream; it stays counted until the ticket is dropped
    pub fn register(&self, room_id: &str, user_id: &str) -> StreamTicket {
        let key = (room_id.to_string(), user_id.to_string());
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        let open = streams.entry(key.clone()).or_insert(0);
        *open += 1;

        debug!(room_id = %room_id, user_id = %user_id, open_streams = *open, "Event stream registered");

        StreamTicket {
            registry: self.clone(),
            key: Some(key),
        }
    }

    pub fn open_streams(&self, room_id: &str, user_id: &str) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(room_id.to_string(), user_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn release(&self, key: &StreamKey) {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(open) = streams.get_mut(key) {
            *open -= 1;
            if *open == 0 {
                streams.remove(key);
            }
        }
    }
}

/// One counted stream in a [`ConnectionRegistry`]
pub struct StreamTicket {
    registry: ConnectionRegistry,
    key: Option<StreamKey>,
}

impl StreamTicket {
    /// Stops counting this stream now instead of at drop
    pub fn release(mut self) {
        if let Some(key) = self.key.take() {
            self.registry.release(&key);
        }
    }
}

impl Drop for StreamTicket {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.registry.release(&key);
        }
    }
}
