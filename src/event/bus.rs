use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use tracing::{debug, error, info, warn};

use super::error::{BusError, RoomEventError};
use super::events::{RoomEnvelope, RoomEvent};

/// Listener cap used when none is configured
pub const DEFAULT_MAX_LISTENERS: usize = 10_000;

/// Callback invoked for every published room event
pub type Listener = dyn Fn(&RoomEnvelope) -> Result<(), RoomEventError> + Send + Sync;

struct Registration {
    id: u64,
    listener: Arc<Listener>,
}

struct BusInner {
    listeners: RwLock<Vec<Registration>>,
    /// Serializes publishes so every listener sees the same event order
    publish_lock: Mutex<()>,
    next_id: AtomicU64,
    max_listeners: usize,
    closed: AtomicBool,
}

impl BusInner {
    fn remove(&self, id: u64) {
        let removed = {
            let mut listeners = self
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            listeners
                .iter()
                .position(|registration| registration.id == id)
                .map(|index| listeners.remove(index))
        };

        // Dropped outside the lock: the listener may own channel senders
        if removed.is_some() {
            debug!(listener_id = id, "Event bus listener removed");
        }
    }
}

/// Process-wide publish/subscribe bus for room events
///
/// The bus is not partitioned by room: every listener sees every publish
/// together with its room id and filters for itself. Listeners run
/// synchronously on the publishing task, in registration order, so they
/// must be quick and must not publish back into the bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .field("max_listeners", &self.inner.max_listeners)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_max_listeners(DEFAULT_MAX_LISTENERS)
    }

    /// Creates a bus that refuses registrations beyond `max_listeners`
    pub fn with_max_listeners(max_listeners: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                listeners: RwLock::new(Vec::new()),
                publish_lock: Mutex::new(()),
                next_id: AtomicU64::new(1),
                max_listeners,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Registers a listener for every subsequent publish
    ///
    /// The listener stays registered until the returned handle is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Result<ListenerHandle, BusError>
    where
        F: Fn(&RoomEnvelope) -> Result<(), RoomEventError> + Send + Sync + 'static,
    {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if self.inner.closed.load(Ordering::Acquire) {
            return Err(BusError::Closed);
        }

        if listeners.len() >= self.inner.max_listeners {
            warn!(
                max_listeners = self.inner.max_listeners,
                "Event bus listener limit reached, rejecting registration"
            );
            return Err(BusError::ListenerLimit(self.inner.max_listeners));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        listeners.push(Registration {
            id,
            listener: Arc::new(listener),
        });

        debug!(
            listener_id = id,
            listeners = listeners.len(),
            "Event bus listener registered"
        );

        Ok(ListenerHandle {
            id,
            bus: Arc::downgrade(&self.inner),
        })
    }

    /// Publishes an event to every registered listener
    ///
    /// Returns how many listeners accepted the event. A listener that fails
    /// or panics is logged and skipped; the rest still receive the event.
    pub fn publish(&self, room_id: &str, event: RoomEvent) -> usize {
        let envelope = RoomEnvelope {
            room_id: room_id.to_string(),
            event,
        };

        let _ordering = self
            .inner
            .publish_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let snapshot: Vec<(u64, Arc<Listener>)> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|registration| (registration.id, Arc::clone(&registration.listener)))
            .collect();

        let mut delivered = 0;
        for (listener_id, listener) in &snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(&envelope))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(
                        listener_id = listener_id,
                        room_id = %room_id,
                        error = %e,
                        "Room event listener failed"
                    );
                }
                Err(payload) => {
                    error!(
                        listener_id = listener_id,
                        room_id = %room_id,
                        panic = %panic_message(payload.as_ref()),
                        "Room event listener panicked"
                    );
                }
            }
        }

        debug!(
            room_id = %room_id,
            event_type = envelope.event.event_type(),
            listeners = snapshot.len(),
            delivered = delivered,
            "Room event published"
        );

        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Shuts the bus down, dropping every listener
    ///
    /// Subscriptions fed by the dropped listeners see their streams end.
    /// Later registrations fail with [`BusError::Closed`].
    pub fn close(&self) -> usize {
        let drained = {
            let mut listeners = self
                .inner
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner.closed.store(true, Ordering::Release);
            std::mem::take(&mut *listeners)
        };

        info!(listeners = drained.len(), "Event bus closed");
        drained.len()
    }
}

/// Registration token returned by [`EventBus::subscribe`]
///
/// Dropping the handle deregisters the listener.
#[derive(Debug)]
pub struct ListenerHandle {
    id: u64,
    bus: Weak<BusInner>,
}

impl ListenerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Deregisters the listener now instead of at drop
    pub fn unsubscribe(self) {}
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.remove(self.id);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
