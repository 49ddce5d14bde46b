//! Timing tests for the async driver, using tokio's paused clock.

use analytics_relay::infrastructure::mocks::CaptureSink;
use analytics_relay::{
    CustomEvent, DeliveryStatus, EventBus, EventEnvelope, RateLimitedDispatcher, SinkDirectory,
    SystemClock, TrackingEvent, TrackingRelay, Whitelist,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn confirmed(name: &str) -> EventEnvelope {
    EventEnvelope::new(
        TrackingEvent::EventOccurred(CustomEvent::new(name)),
        DeliveryStatus::Confirmed,
    )
}

#[tokio::test(start_paused = true)]
async fn test_driver_paces_a_burst() {
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);

    let dispatcher = Arc::new(RateLimitedDispatcher::new(
        move |entry: &'static str| sink.lock().unwrap().push(entry),
        Duration::from_millis(100),
        Arc::new(SystemClock::new()),
    ));

    let driver = dispatcher.spawn_driver();

    dispatcher.submit("a");
    dispatcher.submit("b");
    dispatcher.submit("c");

    assert_eq!(*delivered.lock().unwrap(), vec!["a"]);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(*delivered.lock().unwrap(), vec!["a", "b"]);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*delivered.lock().unwrap(), vec!["a", "b", "c"]);

    // Nothing queued: the timer disarms instead of polling.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(*delivered.lock().unwrap(), vec!["a", "b", "c"]);

    // A fresh burst starts immediately again.
    dispatcher.submit("d");
    assert_eq!(*delivered.lock().unwrap(), vec!["a", "b", "c", "d"]);

    driver.abort();
}

#[tokio::test(start_paused = true)]
async fn test_relay_driver_delivers_queued_hits() {
    let source = Arc::new(EventBus::new());
    let directory = Arc::new(SinkDirectory::new());
    let sink = CaptureSink::new();
    directory.register("ga", Arc::new(sink.clone()));

    let relay = TrackingRelay::builder(source.clone(), directory)
        .with_rate_limit(Duration::from_millis(100))
        .with_whitelist(Whitelist::new().with_event_occurred(true))
        .build()
        .unwrap();
    relay.enable();

    let driver = relay.spawn_driver().expect("rate limiting is enabled");

    source.publish(&confirmed("a"));
    source.publish(&confirmed("b"));
    source.publish(&confirmed("c"));

    assert_eq!(sink.actions(), vec!["a"]);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(sink.actions(), vec!["a", "b", "c"]);

    driver.abort();
}

#[tokio::test(start_paused = true)]
async fn test_no_driver_without_rate_limit() {
    let relay = TrackingRelay::builder(
        Arc::new(EventBus::new()),
        Arc::new(SinkDirectory::new()),
    )
    .build()
    .unwrap();

    assert!(relay.spawn_driver().is_none());
}
