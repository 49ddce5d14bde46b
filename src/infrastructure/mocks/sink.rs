//! Mock analytics sink for testing.

use crate::application::ports::{AnalyticsSink, Hit, SinkError};
use std::sync::{Arc, Mutex};

/// Sink that records every hit it receives.
///
/// A failure can be scripted with [`CaptureSink::fail_with`] to exercise the
/// delivery-failure path; failed hits are not recorded.
#[derive(Clone, Default)]
pub struct CaptureSink {
    state: Arc<Mutex<CaptureState>>,
}

#[derive(Default)]
struct CaptureState {
    hits: Vec<Hit>,
    failure: Option<String>,
}

impl CaptureSink {
    /// Create a sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with the given cause.
    pub fn fail_with(&self, cause: impl Into<String>) {
        self.lock().failure = Some(cause.into());
    }

    /// Make subsequent sends succeed again.
    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// All hits delivered so far.
    pub fn hits(&self) -> Vec<Hit> {
        self.lock().hits.clone()
    }

    /// Number of hits delivered so far.
    pub fn count(&self) -> usize {
        self.lock().hits.len()
    }

    /// Actions of the delivered hits, in delivery order.
    pub fn actions(&self) -> Vec<String> {
        self.lock().hits.iter().map(|hit| hit.action.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CaptureState> {
        self.state
            .lock()
            .expect("CaptureSink mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl std::fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSink")
            .field("hits", &self.count())
            .finish()
    }
}

impl AnalyticsSink for CaptureSink {
    fn send(&self, hit: &Hit) -> Result<(), SinkError> {
        let mut state = self.lock();

        if let Some(cause) = &state.failure {
            return Err(SinkError::new(cause.clone()));
        }

        state.hits.push(hit.clone());
        Ok(())
    }
}
