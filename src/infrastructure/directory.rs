//! Named sink directory.
//!
//! The directory is the process-wide namespace from which the relay resolves
//! its sink at call time. Because resolution is deferred to every delivery, a
//! sink may be installed after the relay has started and picked up without a
//! restart.

use crate::application::ports::{AnalyticsSink, SinkResolver};
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent registry of analytics sinks, keyed by name.
///
/// Backed by DashMap for lock-free reads on the delivery path.
#[derive(Default)]
pub struct SinkDirectory {
    sinks: DashMap<String, Arc<dyn AnalyticsSink>>,
}

impl SinkDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a sink under a name, replacing any previous sink.
    pub fn register(&self, name: impl Into<String>, sink: Arc<dyn AnalyticsSink>) {
        self.sinks.insert(name.into(), sink);
    }

    /// Remove a sink. Deliveries resolving the name afterwards fail as
    /// unavailable.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn AnalyticsSink>> {
        self.sinks.remove(name).map(|(_, sink)| sink)
    }

    /// Number of installed sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sink is installed.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for SinkDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkDirectory")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl SinkResolver for SinkDirectory {
    fn resolve(&self, name: &str) -> Option<Arc<dyn AnalyticsSink>> {
        self.sinks.get(name).map(|entry| Arc::clone(entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{Hit, SinkError};

    struct NullSink;

    impl AnalyticsSink for NullSink {
        fn send(&self, _hit: &Hit) -> Result<(), SinkError> {
            Ok(())
        }
    }

    #[test]
    fn test_resolve_missing_sink() {
        let directory = SinkDirectory::new();

        assert!(directory.resolve("ga").is_none());
        assert!(directory.is_empty());
    }

    #[test]
    fn test_install_later() {
        let directory = SinkDirectory::new();
        assert!(directory.resolve("ga").is_none());

        directory.register("ga", Arc::new(NullSink));
        assert!(directory.resolve("ga").is_some());
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let directory = SinkDirectory::new();
        directory.register("ga", Arc::new(NullSink));

        assert!(directory.unregister("ga").is_some());
        assert!(directory.resolve("ga").is_none());
        assert!(directory.unregister("ga").is_none());
    }
}
