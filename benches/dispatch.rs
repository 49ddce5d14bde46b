use analytics_relay::{
    translate, Clock, CustomEvent, RateLimitedDispatcher, SystemClock, TrackingEvent, Whitelist,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

/// Benchmark the per-event admission and translation path
fn bench_classify_and_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    let whitelist = Whitelist::new()
        .with_goal_completed(true)
        .with_event_occurred(true)
        .with_custom_event("checkoutStarted", true);

    let goal = TrackingEvent::GoalCompleted {
        goal_id: "checkout".into(),
        value: Some(249.9),
        currency: Some("BRL".into()),
    };

    let mut custom = CustomEvent::new("checkoutStarted");
    custom.test_id = Some("pricing-test".into());
    custom.group_id = Some("variant-b".into());
    let custom = TrackingEvent::EventOccurred(custom);

    group.bench_function("admit_goal", |b| {
        b.iter(|| black_box(whitelist.admits(black_box(&goal))))
    });

    group.bench_function("admit_custom_event", |b| {
        b.iter(|| black_box(whitelist.admits(black_box(&custom))))
    });

    group.bench_function("translate_goal", |b| {
        b.iter(|| black_box(translate(black_box(&goal)).unwrap()))
    });

    group.bench_function("translate_custom_event", |b| {
        b.iter(|| black_box(translate(black_box(&custom)).unwrap()))
    });

    group.finish();
}

/// Benchmark dispatch queue overhead (submit plus an expired-timer poll)
fn bench_dispatcher(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatcher");
    group.throughput(Throughput::Elements(1));

    let clock = Arc::new(SystemClock::new());
    let dispatcher = RateLimitedDispatcher::new(
        |entry: u64| {
            black_box(entry);
        },
        Duration::ZERO,
        clock.clone(),
    );

    group.bench_function("submit_and_poll", |b| {
        let mut i = 0u64;
        b.iter(|| {
            dispatcher.submit(black_box(i));
            dispatcher.poll(clock.now());
            i = i.wrapping_add(1);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_classify_and_translate, bench_dispatcher);
criterion_main!(benches);
