//! Tracking relay orchestration.
//!
//! The relay subscribes to an event source, gates envelopes on their delivery
//! status, classifies events against the whitelist, translates admitted
//! events into dispatch records, and hands them to the (optionally
//! rate-limited) delivery path that talks to the analytics sink.

use crate::application::dispatcher::RateLimitedDispatcher;
use crate::application::ports::{Clock, EventSource, Hit, Listener, SinkResolver};
use crate::domain::event::{EventEnvelope, TrackingEvent};
use crate::domain::record::{translate, TranslateError};
use crate::domain::whitelist::Whitelist;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Error returned when building a [`TrackingRelay`] fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The event category must be a non-empty string.
    EmptyCategory,
    /// The sink name must be identifier-shaped.
    InvalidSinkName(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::EmptyCategory => {
                write!(f, "category must not be empty")
            }
            BuildError::InvalidSinkName(name) => {
                write!(f, "sink name \"{}\" is not a valid identifier", name)
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Error surfaced by the relay while handling an envelope.
///
/// Delivery failures are not represented here: they are logged and swallowed
/// so that one bad send never aborts processing of subsequent events. The
/// only hard error is a contract violation from the event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The source delivered an event kind outside the schema.
    UnsupportedEventKind(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::UnsupportedEventKind(kind) => {
                write!(f, "unsupported tracking event kind \"{}\"", kind)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<TranslateError> for DispatchError {
    fn from(error: TranslateError) -> Self {
        match error {
            TranslateError::UnsupportedEventKind(kind) => {
                DispatchError::UnsupportedEventKind(kind)
            }
        }
    }
}

/// Resolves the sink at call time and performs one delivery attempt.
///
/// Failures are reported on the diagnostics channel and swallowed; delivery
/// is best-effort, at-most-once, never retried.
struct HitSender {
    resolver: Arc<dyn SinkResolver>,
    sink_name: String,
}

impl HitSender {
    fn send(&self, hit: Hit) {
        let Some(sink) = self.resolver.resolve(&self.sink_name) else {
            error!(
                "The analytics sink \"{}\" is not registered.",
                self.sink_name
            );
            return;
        };

        match sink.send(&hit) {
            Ok(()) => debug!("Event \"{}\" sent to the analytics sink.", hit.action),
            Err(cause) => error!("Failed to send event \"{}\": {}", hit.action, cause),
        }
    }
}

/// The delivery path: direct, or through the rate-limited queue.
enum Delivery {
    Direct(Arc<HitSender>),
    Limited(Arc<RateLimitedDispatcher<Hit>>),
}

struct RelayInner {
    whitelist: Whitelist,
    category: String,
    delivery: Delivery,
}

impl RelayInner {
    fn handle_event(&self, envelope: &EventEnvelope) -> Result<(), DispatchError> {
        if !envelope.is_confirmed() {
            return Ok(());
        }

        if !self.whitelist.admits(&envelope.event) {
            // An unsupported kind is schema drift, not a whitelist decision.
            if let TrackingEvent::Unsupported { kind } = &envelope.event {
                return Err(DispatchError::UnsupportedEventKind(kind.clone()));
            }

            return Ok(());
        }

        let record = translate(&envelope.event)?;

        let hit = Hit {
            category: self.category.clone(),
            action: record.action,
            label: record.label,
            value: record.value,
        };

        match &self.delivery {
            Delivery::Direct(sender) => sender.send(hit),
            Delivery::Limited(dispatcher) => dispatcher.submit(hit),
        }

        Ok(())
    }
}

/// Relays whitelisted tracking events to a named analytics sink.
///
/// Two-state lifecycle: disabled (initial) and enabled (subscribed to the
/// event source). [`enable`](Self::enable) registers a single listener and is
/// idempotent; [`disable`](Self::disable) deregisters it, and a later
/// [`enable`](Self::enable) registers a fresh one. Entries already queued in
/// the rate limiter when the relay is disabled still execute later.
pub struct TrackingRelay {
    inner: Arc<RelayInner>,
    source: Arc<dyn EventSource>,
    listener: Mutex<Option<Listener>>,
}

impl TrackingRelay {
    /// Start configuring a relay for the given source and sink resolver.
    pub fn builder(
        source: Arc<dyn EventSource>,
        resolver: Arc<dyn SinkResolver>,
    ) -> TrackingRelayBuilder {
        TrackingRelayBuilder {
            source,
            resolver,
            sink_name: "ga".into(),
            category: "Croct".into(),
            rate_limit: None,
            whitelist: Whitelist::new(),
            clock: None,
        }
    }

    /// Subscribe to the event source.
    ///
    /// Calling this while already enabled does not register a second
    /// listener.
    pub fn enable(&self) {
        let mut slot = self.lock_listener();

        if slot.is_some() {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let listener: Listener = Arc::new(move |envelope: &EventEnvelope| {
            if let Err(error) = inner.handle_event(envelope) {
                error!("Tracking event source contract violation: {}", error);
            }
        });

        self.source.add_listener(Arc::clone(&listener));
        *slot = Some(listener);
    }

    /// Unsubscribe from the event source.
    ///
    /// Queued rate-limited entries are not cancelled; they drain on their
    /// own schedule.
    pub fn disable(&self) {
        if let Some(listener) = self.lock_listener().take() {
            self.source.remove_listener(&listener);
        }
    }

    /// Whether the relay is currently subscribed.
    pub fn is_enabled(&self) -> bool {
        self.lock_listener().is_some()
    }

    /// Handle a single envelope directly, bypassing the event source.
    ///
    /// # Errors
    /// Returns [`DispatchError::UnsupportedEventKind`] when the source
    /// delivered a kind outside the schema. Delivery failures are logged and
    /// swallowed, never returned.
    pub fn handle(&self, envelope: &EventEnvelope) -> Result<(), DispatchError> {
        self.inner.handle_event(envelope)
    }

    /// Fire the rate-limit timer if it expired at `now`.
    ///
    /// No-op when rate limiting is disabled. Hosts running the async driver
    /// never need to call this.
    pub fn poll(&self, now: Instant) {
        if let Delivery::Limited(dispatcher) = &self.inner.delivery {
            dispatcher.poll(now);
        }
    }

    /// Deadline of the armed rate-limit timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.inner.delivery {
            Delivery::Limited(dispatcher) => dispatcher.next_deadline(),
            Delivery::Direct(_) => None,
        }
    }

    /// Number of hits queued behind the rate-limit timer.
    pub fn pending(&self) -> usize {
        match &self.inner.delivery {
            Delivery::Limited(dispatcher) => dispatcher.pending(),
            Delivery::Direct(_) => 0,
        }
    }

    /// Spawn the task driving the rate-limit timer.
    ///
    /// Returns `None` when rate limiting is disabled and no driver is
    /// needed.
    #[cfg(feature = "async")]
    pub fn spawn_driver(&self) -> Option<tokio::task::JoinHandle<()>> {
        match &self.inner.delivery {
            Delivery::Limited(dispatcher) => Some(dispatcher.spawn_driver()),
            Delivery::Direct(_) => None,
        }
    }

    fn lock_listener(&self) -> std::sync::MutexGuard<'_, Option<Listener>> {
        self.listener
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Drop for TrackingRelay {
    fn drop(&mut self) {
        self.disable();
    }
}

/// Builder for constructing a [`TrackingRelay`].
pub struct TrackingRelayBuilder {
    source: Arc<dyn EventSource>,
    resolver: Arc<dyn SinkResolver>,
    sink_name: String,
    category: String,
    rate_limit: Option<Duration>,
    whitelist: Whitelist,
    clock: Option<Arc<dyn Clock>>,
}

impl TrackingRelayBuilder {
    /// Set the name under which the sink is resolved at call time.
    ///
    /// Default: `"ga"`. The name will be validated when `build()` is called.
    pub fn with_sink_name(mut self, name: impl Into<String>) -> Self {
        self.sink_name = name.into();
        self
    }

    /// Set the category attached to every hit.
    ///
    /// Default: `"Croct"`. Must be non-empty; validated when `build()` is
    /// called.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the minimum interval between sink calls.
    ///
    /// A zero interval disables rate limiting entirely: hits are sent
    /// synchronously, unqueued. Default: disabled.
    pub fn with_rate_limit(mut self, interval: Duration) -> Self {
        self.rate_limit = Some(interval);
        self
    }

    /// Set the event whitelist.
    ///
    /// Default: nothing is tracked.
    pub fn with_whitelist(mut self, whitelist: Whitelist) -> Self {
        self.whitelist = whitelist;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the configuration and build the relay.
    ///
    /// # Errors
    /// Returns [`BuildError::EmptyCategory`] for an empty category and
    /// [`BuildError::InvalidSinkName`] for a sink name that is not
    /// identifier-shaped.
    pub fn build(self) -> Result<TrackingRelay, BuildError> {
        if self.category.is_empty() {
            return Err(BuildError::EmptyCategory);
        }

        if !is_identifier(&self.sink_name) {
            return Err(BuildError::InvalidSinkName(self.sink_name));
        }

        let sender = Arc::new(HitSender {
            resolver: self.resolver,
            sink_name: self.sink_name,
        });

        let delivery = match self.rate_limit {
            Some(interval) if !interval.is_zero() => {
                let clock = self
                    .clock
                    .unwrap_or_else(|| Arc::new(crate::infrastructure::clock::SystemClock::new()));

                Delivery::Limited(Arc::new(RateLimitedDispatcher::new(
                    move |hit| sender.send(hit),
                    interval,
                    clock,
                )))
            }
            _ => Delivery::Direct(sender),
        };

        Ok(TrackingRelay {
            inner: Arc::new(RelayInner {
                whitelist: self.whitelist,
                category: self.category,
                delivery,
            }),
            source: self.source,
            listener: Mutex::new(None),
        })
    }
}

/// Identifier shape accepted for sink names: a leading letter, underscore or
/// dollar sign, followed by the same set plus digits.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
