//! Mock tracing layer for asserting diagnostics.

use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::Layer;

/// Layer that captures emitted diagnostics for testing.
///
/// Used to assert the relay's success notices and failure reports without
/// touching a real subscriber.
#[derive(Clone, Default)]
pub struct CaptureLayer {
    captured: Arc<Mutex<Vec<CapturedLog>>>,
}

/// A captured diagnostic.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CapturedLog {
    /// Severity of the diagnostic.
    pub level: Level,
    /// The rendered message field.
    pub message: String,
}

impl CaptureLayer {
    /// Create a new capture layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured diagnostics.
    pub fn captured(&self) -> Vec<CapturedLog> {
        self.lock().clone()
    }

    /// Number of captured diagnostics.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Messages captured at the given level, in emission order.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|log| log.level == level)
            .map(|log| log.message.clone())
            .collect()
    }

    /// Clear all captured diagnostics.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CapturedLog>> {
        self.captured
            .lock()
            .expect("CaptureLayer mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);

        self.lock().push(CapturedLog {
            level: *event.metadata().level(),
            message: visitor.message,
        });
    }
}

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, error};
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_captures_level_and_message() {
        let capture = CaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            debug!("sent");
            error!("failed");
        });

        assert_eq!(capture.count(), 2);
        assert_eq!(capture.messages_at(Level::DEBUG), vec!["sent"]);
        assert_eq!(capture.messages_at(Level::ERROR), vec!["failed"]);

        capture.clear();
        assert_eq!(capture.count(), 0);
    }
}
