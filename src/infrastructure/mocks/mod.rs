//! Mock implementations for testing.
//!
//! Available with the `test-helpers` feature or in test builds. Provides
//! controllable test doubles for timing, sink delivery, and diagnostics.

mod clock;
mod layer;
mod sink;

pub use clock::MockClock;
pub use layer::{CaptureLayer, CapturedLog};
pub use sink::CaptureSink;
