//! Whitelist admission rules.
//!
//! The whitelist decides which tracking events are permitted to leave the
//! process. Nothing is tracked unless explicitly enabled.

use crate::domain::event::TrackingEvent;
use ahash::AHashMap;

/// Per-kind (and per-name, for custom events) admission configuration.
///
/// All kinds default to disabled. Custom events have a second-level rule:
/// when `eventOccurred` is enabled and no custom-event map is supplied, every
/// name is admitted (open world); once a map is supplied, only names mapped to
/// `true` are admitted (closed world). The map is never consulted while the
/// top-level `eventOccurred` flag is off.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Whitelist {
    test_group_assigned: bool,
    goal_completed: bool,
    event_occurred: bool,
    custom_events: Option<AHashMap<String, bool>>,
}

impl Whitelist {
    /// Create a whitelist that admits nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable `testGroupAssigned` events.
    pub fn with_test_group_assigned(mut self, enabled: bool) -> Self {
        self.test_group_assigned = enabled;
        self
    }

    /// Enable or disable `goalCompleted` events.
    pub fn with_goal_completed(mut self, enabled: bool) -> Self {
        self.goal_completed = enabled;
        self
    }

    /// Enable or disable `eventOccurred` events.
    ///
    /// Enabling this admits every custom event name until a custom-event
    /// rule is added with [`Whitelist::with_custom_event`].
    pub fn with_event_occurred(mut self, enabled: bool) -> Self {
        self.event_occurred = enabled;
        self
    }

    /// Add a per-name rule for a custom event.
    ///
    /// Supplying any rule switches custom-event admission to closed-world:
    /// only names explicitly mapped to `true` are admitted from then on.
    pub fn with_custom_event(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.custom_events
            .get_or_insert_with(AHashMap::new)
            .insert(name.into(), enabled);
        self
    }

    /// Decide whether an event is admitted.
    ///
    /// Pure decision function; the confirmed-status gate is applied earlier,
    /// at the orchestration boundary.
    pub fn admits(&self, event: &TrackingEvent) -> bool {
        match event {
            TrackingEvent::TestGroupAssigned { .. } => self.test_group_assigned,
            TrackingEvent::GoalCompleted { .. } => self.goal_completed,
            TrackingEvent::EventOccurred(custom) => {
                if !self.event_occurred {
                    return false;
                }

                match &self.custom_events {
                    None => true,
                    Some(rules) => rules.get(&custom.name).copied().unwrap_or(false),
                }
            }
            // Schema drift is surfaced by the translator, never admitted.
            TrackingEvent::Unsupported { .. } => false,
        }
    }
}
