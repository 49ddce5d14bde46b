//! # analytics-relay
//!
//! Whitelist-driven relay of tracking events to pluggable analytics sinks,
//! with rate-limited delivery.
//!
//! The relay subscribes to a push-model event source, keeps only envelopes
//! whose delivery was confirmed, classifies each event against a whitelist,
//! translates admitted events into a flat `(action, label, value?)` record,
//! and hands the record to an analytics sink resolved by name at call time.
//! An optional rate limit queues outbound calls so that no two sink calls are
//! closer together than a configured interval, in submission order, without
//! ever dropping one.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use analytics_relay::{
//!     CallbackSink, EventBus, SinkDirectory, TrackingRelay, Whitelist,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let source = Arc::new(EventBus::new());
//! let directory = Arc::new(SinkDirectory::new());
//!
//! let relay = TrackingRelay::builder(source.clone(), directory.clone())
//!     .with_category("Croct")
//!     .with_rate_limit(Duration::from_millis(500))
//!     .with_whitelist(
//!         Whitelist::new()
//!             .with_goal_completed(true)
//!             .with_event_occurred(true)
//!             .with_custom_event("checkoutStarted", true),
//!     )
//!     .build()
//!     .unwrap();
//!
//! relay.enable();
//!
//! // The sink may be installed after the relay starts; deliveries resolve
//! // it by name on every call.
//! directory.register(
//!     "ga",
//!     Arc::new(CallbackSink::from_fn(|hit_type, hit| {
//!         println!("{} {}: {}", hit_type, hit.action, hit.label);
//!     })),
//! );
//! ```
//!
//! ## Whitelisting
//!
//! Nothing is tracked by default. Each event kind is enabled individually;
//! custom events (`eventOccurred`) additionally support per-name rules. With
//! `eventOccurred` enabled and no per-name rule, every name is admitted; once
//! a rule exists, only names explicitly enabled are admitted. The per-name
//! rules are never consulted while the top-level flag is off.
//!
//! ## Rate limiting
//!
//! The rate limiter is a FIFO queue behind a one-shot timer: the first call
//! in an idle window executes immediately, later calls are spaced exactly one
//! interval apart, and once the queue drains the timer disarms. With the
//! `async` feature, `TrackingRelay::spawn_driver` runs the timer on a
//! dedicated tokio task. Hosts without a runtime drive it themselves:
//!
//! ```rust,no_run
//! # use analytics_relay::{EventBus, SinkDirectory, TrackingRelay};
//! # use std::sync::Arc;
//! # use std::time::{Duration, Instant};
//! let relay = TrackingRelay::builder(
//!     Arc::new(EventBus::new()),
//!     Arc::new(SinkDirectory::new()),
//! )
//! .with_rate_limit(Duration::from_millis(500))
//! .build()
//! .unwrap();
//!
//! // On a timer or scheduler tick:
//! relay.poll(Instant::now());
//! ```
//!
//! ## Diagnostics
//!
//! Outcomes are reported through `tracing`: a debug notice per delivered
//! event, an error when the sink is not registered or rejects a call.
//! Delivery failures never propagate to the event source and are never
//! retried.
//!
//! ## Testing
//!
//! The `test-helpers` feature exposes `infrastructure::mocks` with a
//! controllable clock, a capturing sink, and a tracing capture layer for
//! deterministic timing and diagnostics assertions.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    event::{CustomEvent, DeliveryStatus, EventContext, EventEnvelope, TrackingEvent},
    record::{translate, DispatchRecord, TranslateError},
    whitelist::Whitelist,
};

pub use application::{
    dispatcher::RateLimitedDispatcher,
    ports::{AnalyticsSink, Clock, EventSource, Hit, Listener, SinkError, SinkResolver, HIT_TYPE},
    relay::{BuildError, DispatchError, TrackingRelay, TrackingRelayBuilder},
};

pub use infrastructure::{
    bus::EventBus,
    clock::SystemClock,
    directory::SinkDirectory,
    sinks::{CallbackSink, CommandQueueSink, TrackerHandle},
};
