//! Translation of admitted events into dispatch records.

use crate::domain::event::TrackingEvent;

/// The canonical flat record handed to the analytics sink.
///
/// Created once per admitted event, consumed by a single sink call, then
/// discarded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchRecord {
    /// The event kind tag, or the event's own name for custom events.
    pub action: String,
    /// Comma-joined `key: value` fragments in the per-kind field order.
    pub label: String,
    /// The event's numeric value, carried verbatim when present.
    pub value: Option<f64>,
}

/// Error raised when translation meets an event kind outside the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// The source delivered a kind this relay does not understand.
    /// This is a contract violation from the event source, not a
    /// recoverable delivery failure.
    UnsupportedEventKind(String),
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::UnsupportedEventKind(kind) => {
                write!(f, "unsupported tracking event kind \"{}\"", kind)
            }
        }
    }
}

impl std::error::Error for TranslateError {}

/// Translate a tracking event into its dispatch record.
///
/// Label fragments are `"<key>: <value>"`, joined with `", "`, and a fragment
/// is included only when its field is present. Values are carried verbatim,
/// with no rounding or escaping; the sink owns any further encoding.
///
/// # Errors
/// Returns [`TranslateError::UnsupportedEventKind`] for
/// [`TrackingEvent::Unsupported`], signaling schema drift from the source.
pub fn translate(event: &TrackingEvent) -> Result<DispatchRecord, TranslateError> {
    match event {
        TrackingEvent::TestGroupAssigned { test_id, group_id } => Ok(DispatchRecord {
            action: "testGroupAssigned".into(),
            label: format!("testId: {}, groupId: {}", test_id, group_id),
            value: None,
        }),
        TrackingEvent::GoalCompleted {
            goal_id,
            value,
            currency,
        } => {
            let mut entries = vec![format!("goalId: {}", goal_id)];

            if let Some(currency) = currency {
                entries.push(format!("currency: {}", currency));
            }

            Ok(DispatchRecord {
                action: "goalCompleted".into(),
                label: entries.join(", "),
                value: *value,
            })
        }
        TrackingEvent::EventOccurred(custom) => {
            let mut entries = Vec::new();

            if let Some(test_id) = &custom.test_id {
                entries.push(format!("testId: {}", test_id));
            }

            if let Some(group_id) = &custom.group_id {
                entries.push(format!("groupId: {}", group_id));
            }

            if let Some(personalization_id) = &custom.personalization_id {
                entries.push(format!("personalizationId: {}", personalization_id));
            }

            if let Some(audience) = &custom.audience {
                entries.push(format!("audience: {}", audience));
            }

            Ok(DispatchRecord {
                action: custom.name.clone(),
                label: entries.join(", "),
                value: None,
            })
        }
        TrackingEvent::Unsupported { kind } => {
            Err(TranslateError::UnsupportedEventKind(kind.clone()))
        }
    }
}
