//! Tracking event model.
//!
//! Events are produced by the host's event source and pushed into the relay
//! wrapped in an [`EventEnvelope`]. The relay never mutates them.

use std::collections::BTreeMap;

/// Delivery status of a tracking event as reported by the event source.
///
/// Only [`DeliveryStatus::Confirmed`] envelopes are eligible for relaying;
/// everything else is filtered out before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum DeliveryStatus {
    /// The event was recorded but not yet acknowledged by the tracking backend.
    Pending,
    /// The tracking backend acknowledged the event.
    Confirmed,
    /// The tracking backend rejected the event.
    Failed,
    /// The event was discarded before reaching the tracking backend.
    Ignored,
}

/// A custom event reported through the `eventOccurred` channel.
///
/// Only the `name` is mandatory; the optional fields describe the
/// experiment or personalization context that produced the event.
/// `details` carries arbitrary extra payload and is never inspected
/// by the relay.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CustomEvent {
    /// The event name, used both for whitelisting and as the dispatch action.
    pub name: String,
    /// The A/B test that produced the event, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub test_id: Option<String>,
    /// The test group assigned to the user, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub group_id: Option<String>,
    /// The personalization that produced the event, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub personalization_id: Option<String>,
    /// The audience the user matched, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub audience: Option<String>,
    /// Arbitrary extra payload, carried verbatim and ignored by translation.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl CustomEvent {
    /// Create a custom event with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test_id: None,
            group_id: None,
            personalization_id: None,
            audience: None,
            details: BTreeMap::new(),
        }
    }
}

/// A tracking event delivered by the event source.
///
/// The three known kinds mirror the tracked subset of the source's schema.
/// [`TrackingEvent::Unsupported`] represents a kind outside that subset: it is
/// never admitted, and translating it fails fast to surface schema drift from
/// the upstream source instead of silently dropping it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum TrackingEvent {
    /// The user was assigned to a group of an A/B test.
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    TestGroupAssigned {
        /// The test identifier.
        test_id: String,
        /// The assigned group identifier.
        group_id: String,
    },
    /// The user completed a goal, optionally with a monetary value.
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    GoalCompleted {
        /// The goal identifier.
        goal_id: String,
        /// The goal's numeric value, carried verbatim.
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        value: Option<f64>,
        /// The currency of the value, if any.
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        currency: Option<String>,
    },
    /// A named custom event occurred.
    EventOccurred(CustomEvent),
    /// An event kind this relay does not understand.
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    Unsupported {
        /// The raw kind tag reported by the source.
        kind: String,
    },
}

impl TrackingEvent {
    /// The kind tag of the event, as the source spells it.
    pub fn kind(&self) -> &str {
        match self {
            TrackingEvent::TestGroupAssigned { .. } => "testGroupAssigned",
            TrackingEvent::GoalCompleted { .. } => "goalCompleted",
            TrackingEvent::EventOccurred(_) => "eventOccurred",
            TrackingEvent::Unsupported { kind } => kind,
        }
    }
}

/// The page context in which an event was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EventContext {
    /// The browser tab that recorded the event.
    pub tab_id: String,
    /// The page URL at recording time.
    pub url: String,
}

/// A tracking event wrapped with its delivery metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EventEnvelope {
    /// The wrapped event.
    pub event: TrackingEvent,
    /// The delivery status reported by the source.
    pub status: DeliveryStatus,
    /// Milliseconds since the Unix epoch at recording time.
    pub timestamp: u64,
    /// The page context of the recording.
    pub context: EventContext,
}

impl EventEnvelope {
    /// Wrap an event with a status, using an empty context and zero timestamp.
    pub fn new(event: TrackingEvent, status: DeliveryStatus) -> Self {
        Self {
            event,
            status,
            timestamp: 0,
            context: EventContext::default(),
        }
    }

    /// Whether the envelope passed the confirmed-status gate.
    pub fn is_confirmed(&self) -> bool {
        self.status == DeliveryStatus::Confirmed
    }
}
