//! In-process event bus.
//!
//! A minimal push-model [`EventSource`] for hosts that deliver envelopes from
//! within the same process, and for integration tests.

use crate::application::ports::{EventSource, Listener};
use crate::domain::event::EventEnvelope;
use std::sync::{Arc, Mutex};

/// Push-model event source with explicit listener registration.
///
/// Listener identity is the `Arc` allocation: removal compares with
/// `Arc::ptr_eq`, so the exact listener value passed to `add_listener` must
/// be used to remove it.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<Listener>>,
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an envelope to every registered listener, in registration
    /// order.
    ///
    /// Listeners are invoked outside the registry lock, so a listener may
    /// add or remove listeners; such changes take effect from the next
    /// publish.
    pub fn publish(&self, envelope: &EventEnvelope) {
        let listeners = self.lock().clone();

        for listener in listeners {
            listener(envelope);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Listener>> {
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventSource for EventBus {
    fn add_listener(&self, listener: Listener) {
        self.lock().push(listener);
    }

    fn remove_listener(&self, listener: &Listener) {
        self.lock()
            .retain(|registered| !Arc::ptr_eq(registered, listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{CustomEvent, DeliveryStatus, TrackingEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn envelope() -> EventEnvelope {
        EventEnvelope::new(
            TrackingEvent::EventOccurred(CustomEvent::new("foo")),
            DeliveryStatus::Confirmed,
        )
    }

    #[test]
    fn test_publish_reaches_all_listeners() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let count = Arc::clone(&count);
            bus.add_listener(Arc::new(move |_envelope| {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }

        bus.publish(&envelope());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_listener_by_identity() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let listener: Listener = Arc::new(move |_envelope| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.add_listener(Arc::clone(&listener));
        bus.publish(&envelope());

        bus.remove_listener(&listener);
        bus.publish(&envelope());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }
}
