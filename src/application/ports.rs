//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::event::EventEnvelope;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

/// Port for obtaining current time.
///
/// This abstraction allows the application layer to work with time
/// without depending on system clock implementation details.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// The outbound payload submitted to an analytics sink.
///
/// The hit type is always `"event"`; the remaining fields are positional in
/// the historical sink shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// The configured event category.
    pub category: String,
    /// The dispatch action.
    pub action: String,
    /// The dispatch label.
    pub label: String,
    /// The dispatch value, when present.
    pub value: Option<f64>,
}

/// The constant hit type of every payload this relay produces.
pub const HIT_TYPE: &str = "event";

/// Error reported by a sink that accepted the call but failed to deliver it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    cause: String,
}

impl SinkError {
    /// Create a sink error with a cause description.
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl std::error::Error for SinkError {}

/// Port for the external analytics endpoint.
///
/// The sink may defer its own completion internally; the relay only observes
/// failures the sink reports synchronously.
pub trait AnalyticsSink: Send + Sync {
    /// Submit a hit for delivery.
    fn send(&self, hit: &Hit) -> Result<(), SinkError>;
}

/// Port for resolving a sink by name at call time.
///
/// Resolution happens on every delivery, never at construction, so a sink may
/// be installed by the environment after the relay starts.
pub trait SinkResolver: Send + Sync {
    /// Look up a sink by name. Returns `None` while the sink is not installed.
    fn resolve(&self, name: &str) -> Option<Arc<dyn AnalyticsSink>>;
}

/// A registered event listener.
pub type Listener = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

/// Port for the event source the relay subscribes to.
///
/// Push model: the source invokes every registered listener once per
/// envelope. Listener identity is the `Arc` allocation, so the exact value
/// passed to [`EventSource::add_listener`] must be used to remove it.
pub trait EventSource: Send + Sync {
    /// Register a listener.
    fn add_listener(&self, listener: Listener);

    /// Deregister a previously registered listener.
    fn remove_listener(&self, listener: &Listener);
}
