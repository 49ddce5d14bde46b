//! Rate-limited dispatch queue.
//!
//! Wraps a delivery function so that submissions are replayed at most once
//! per configured interval, in submission order, and never dropped.

use crate::application::ports::Clock;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One-shot timer state of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    /// No timer armed; the next submission executes immediately.
    Idle,
    /// A delivery happened recently; the next one waits for the deadline.
    Armed { deadline: Instant },
}

#[derive(Debug)]
struct DispatcherState<T> {
    queue: VecDeque<T>,
    timer: TimerState,
}

/// A FIFO dispatch queue that spaces deliveries by a minimum interval.
///
/// The first submission in an idle window is delivered immediately;
/// submissions arriving within the interval are queued, and each successive
/// delivery is spaced exactly one interval apart. Once the queue empties the
/// timer is disarmed (no idle polling) and a fresh burst again starts with an
/// immediate delivery. N submissions always produce exactly N deliveries, in
/// submission order; nothing is coalesced, reordered, or cancelled.
///
/// The queue is guarded by a single mutex and deliveries run on whichever
/// thread triggers them ([`submit`](Self::submit) or [`poll`](Self::poll)),
/// one at a time. The timer is logical: something must drive it, either by
/// calling [`poll`](Self::poll) or, with the `async` feature, by spawning the
/// [driver task](Self::spawn_driver).
pub struct RateLimitedDispatcher<T> {
    deliver: Box<dyn Fn(T) + Send + Sync>,
    interval: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<DispatcherState<T>>,
    #[cfg(feature = "async")]
    wakeup: tokio::sync::Notify,
}

impl<T> std::fmt::Debug for RateLimitedDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedDispatcher")
            .field("interval", &self.interval)
            .field("pending", &self.pending())
            .finish()
    }
}

impl<T> RateLimitedDispatcher<T> {
    /// Wrap a delivery function with rate limiting.
    ///
    /// # Arguments
    /// * `deliver` - The function invoked once per submission
    /// * `interval` - Minimum spacing between deliveries
    /// * `clock` - Time source for arming deadlines
    pub fn new(
        deliver: impl Fn(T) + Send + Sync + 'static,
        interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            deliver: Box::new(deliver),
            interval,
            clock,
            state: Mutex::new(DispatcherState {
                queue: VecDeque::new(),
                timer: TimerState::Idle,
            }),
            #[cfg(feature = "async")]
            wakeup: tokio::sync::Notify::new(),
        }
    }

    /// Submit an entry for delivery.
    ///
    /// Never blocks beyond the queue lock and returns nothing: delivery is
    /// fire-and-forget. When the dispatcher is idle, or the armed timer has
    /// already expired, the entry is delivered synchronously before this
    /// call returns.
    pub fn submit(&self, entry: T) {
        let now = self.clock.now();

        {
            let mut state = self.lock();

            // An expired-but-unobserved trailing timer must not delay a
            // fresh call; expire it here instead of waiting for a poll.
            if let TimerState::Armed { deadline } = state.timer {
                if now >= deadline {
                    state.timer = TimerState::Idle;
                }
            }

            state.queue.push_back(entry);
        }

        self.drain();

        #[cfg(feature = "async")]
        self.wakeup.notify_one();
    }

    /// Fire the timer if it expired at `now`, delivering the next entry.
    ///
    /// Callers driving the dispatcher manually should invoke this at (or
    /// after) [`next_deadline`](Self::next_deadline). Calling it early or
    /// while idle is a no-op.
    pub fn poll(&self, now: Instant) {
        {
            let mut state = self.lock();

            match state.timer {
                TimerState::Armed { deadline } if now >= deadline => {
                    state.timer = TimerState::Idle;
                }
                _ => return,
            }
        }

        self.drain();
    }

    /// The armed deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.lock().timer {
            TimerState::Armed { deadline } => Some(deadline),
            TimerState::Idle => None,
        }
    }

    /// Number of entries waiting behind the armed timer.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Whether the dispatcher has no armed timer and nothing queued.
    pub fn is_idle(&self) -> bool {
        let state = self.lock();
        state.queue.is_empty() && state.timer == TimerState::Idle
    }

    /// Pop and deliver the head of the queue unless a timer is armed.
    ///
    /// Arms the timer whenever something was popped, so at most one entry is
    /// delivered per invocation. The delivery itself runs outside the lock.
    fn drain(&self) {
        let next = {
            let mut state = self.lock();

            if let TimerState::Armed { .. } = state.timer {
                return;
            }

            match state.queue.pop_front() {
                Some(entry) => {
                    state.timer = TimerState::Armed {
                        deadline: self.clock.now() + self.interval,
                    };
                    entry
                }
                None => return,
            }
        };

        (self.deliver)(next);
    }

    /// Disarm the timer and deliver the next entry, but only if the armed
    /// deadline is still the one the driver slept for. A submission may have
    /// fired the expired timer first and armed a new deadline; that deadline
    /// gets its own full sleep.
    #[cfg(feature = "async")]
    fn fire_at(&self, deadline: Instant) {
        {
            let mut state = self.lock();

            match state.timer {
                TimerState::Armed { deadline: armed } if armed == deadline => {
                    state.timer = TimerState::Idle;
                }
                _ => return,
            }
        }

        self.drain();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DispatcherState<T>> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(feature = "async")]
impl<T: Send + 'static> RateLimitedDispatcher<T> {
    /// Spawn the single-consumer task that drives the timer.
    ///
    /// The task sleeps while idle (no polling) and wakes on submission.
    /// Aborting it stops timed deliveries but does not discard queued
    /// entries; a later driver resumes where the queue left off.
    pub fn spawn_driver(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let dispatcher = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                match dispatcher.next_deadline() {
                    Some(deadline) => {
                        let wait = deadline.saturating_duration_since(dispatcher.clock.now());
                        tokio::time::sleep(wait).await;
                        dispatcher.fire_at(deadline);
                    }
                    None => dispatcher.wakeup.notified().await,
                }
            }
        })
    }
}
