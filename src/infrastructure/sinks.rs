//! Sink adapters for the two historical analytics endpoint shapes.
//!
//! - [`CallbackSink`]: a direct callable taking the positional hit fields.
//! - [`CommandQueueSink`]: a command-queue endpoint that fans one logical
//!   send out to every registered tracker, the way analytics.js enumerates
//!   its trackers.

use crate::application::ports::{AnalyticsSink, Hit, SinkError, HIT_TYPE};
use std::sync::{Arc, RwLock};

/// Sink adapter over a plain callable.
///
/// The callable receives the hit type (always `"event"`) ahead of the hit
/// fields, matching the positional shape of the historical endpoint.
pub struct CallbackSink {
    callback: Box<dyn Fn(&str, &Hit) -> Result<(), SinkError> + Send + Sync>,
}

impl CallbackSink {
    /// Wrap a callable as a sink.
    pub fn new(
        callback: impl Fn(&str, &Hit) -> Result<(), SinkError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Wrap an infallible callable as a sink.
    pub fn from_fn(callback: impl Fn(&str, &Hit) + Send + Sync + 'static) -> Self {
        Self::new(move |hit_type, hit| {
            callback(hit_type, hit);
            Ok(())
        })
    }
}

impl std::fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSink").finish_non_exhaustive()
    }
}

impl AnalyticsSink for CallbackSink {
    fn send(&self, hit: &Hit) -> Result<(), SinkError> {
        (self.callback)(HIT_TYPE, hit)
    }
}

/// A tracker registered with a [`CommandQueueSink`].
///
/// Receives the command verb (always `"send"`), the hit type, and the hit
/// fields.
pub trait TrackerHandle: Send + Sync {
    /// Forward one hit to this tracker.
    fn send(&self, hit_type: &str, hit: &Hit) -> Result<(), SinkError>;
}

/// Sink adapter modeling the analytics.js command queue.
///
/// One logical send is fanned out to every registered tracker; the first
/// tracker failure surfaces as the sink's failure. Trackers may be added
/// after the sink is installed.
#[derive(Default)]
pub struct CommandQueueSink {
    trackers: RwLock<Vec<Arc<dyn TrackerHandle>>>,
}

impl CommandQueueSink {
    /// Create a sink with no trackers.
    ///
    /// Sending through an empty sink succeeds and reaches nobody, matching
    /// the command queue's behavior before any tracker is created.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tracker.
    pub fn add_tracker(&self, tracker: Arc<dyn TrackerHandle>) {
        self.lock_trackers().push(tracker);
    }

    /// Number of registered trackers.
    pub fn tracker_count(&self) -> usize {
        self.trackers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    fn lock_trackers(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<dyn TrackerHandle>>> {
        self.trackers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CommandQueueSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueueSink")
            .field("trackers", &self.tracker_count())
            .finish()
    }
}

impl AnalyticsSink for CommandQueueSink {
    fn send(&self, hit: &Hit) -> Result<(), SinkError> {
        let trackers = self
            .trackers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        for tracker in trackers {
            tracker.send(HIT_TYPE, hit)?;
        }

        Ok(())
    }
}
