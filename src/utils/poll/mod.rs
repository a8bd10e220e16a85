//! Deadline-bounded polling with jittered settle delays.
//!
//! The host page gives no synchronous acknowledgment of any action, so every
//! state transition is inferred by sampling until a condition holds. Retries
//! are bounded by time, never by count.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::trace;

/// Default scheduler tick (one animation frame at 60 Hz).
pub const DEFAULT_FRAME_MS: u64 = 16;

/// Cooperative scheduling capability injected into the core.
///
/// Each retry is a fresh continuation scheduled through `next_tick`; the
/// caller's context is never blocked.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Current instant on the scheduler's clock.
    fn now(&self) -> Instant;

    /// Suspend until the next tick of the host loop.
    async fn next_tick(&self);

    /// Suspend for a fixed duration.
    async fn sleep(&self, duration: Duration);
}

/// Scheduler backed by tokio timers.
///
/// Uses `tokio::time::Instant`, so tests can drive it under paused time.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    frame: Duration,
}

impl TokioScheduler {
    pub fn new(frame: Duration) -> Self {
        Self { frame }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_FRAME_MS))
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn next_tick(&self) {
        tokio::time::sleep(self.frame).await;
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Randomized delay range: `[min_ms, min_ms + spread_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Jitter {
    /// Lower bound in milliseconds.
    pub min_ms: u64,
    /// Width of the random range in milliseconds. 0 = fixed delay.
    pub spread_ms: u64,
}

impl Default for Jitter {
    fn default() -> Self {
        Self::new(200, 150)
    }
}

impl Jitter {
    pub const fn new(min_ms: u64, spread_ms: u64) -> Self {
        Self { min_ms, spread_ms }
    }

    /// No delay at all.
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Draw a delay from the range.
    pub fn sample(&self) -> Duration {
        let extra = if self.spread_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..self.spread_ms)
        };
        Duration::from_millis(self.min_ms + extra)
    }

    /// Largest delay `sample` can return.
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.min_ms + self.spread_ms.saturating_sub(1))
    }
}

/// Absolute point in time after which a wait gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    started: Instant,
    at: Instant,
}

impl Deadline {
    /// Deadline `timeout` after `now`.
    pub fn after(now: Instant, timeout: Duration) -> Self {
        Self {
            started: now,
            at: now + timeout,
        }
    }

    /// Whether `now` is strictly later than the deadline.
    pub fn is_past(&self, now: Instant) -> bool {
        now > self.at
    }

    /// The absolute deadline.
    pub fn at(&self) -> Instant {
        self.at
    }

    /// Time elapsed since the wait started.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }
}

/// A wait's deadline elapsed before its condition held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("condition not met within {waited:?}")]
pub struct DeadlineElapsed {
    pub waited: Duration,
}

/// Sample `condition` once per tick until it holds or `deadline` passes.
///
/// The condition is evaluated first on every tick. When it holds, the call
/// sleeps one `settle` delay to let animations finish and resolves. When it
/// does not hold and the deadline has passed, the call rejects. Otherwise it
/// suspends until the next tick and tries again.
///
/// Conditions must be pure reads; the only tolerated side effect is the
/// caller's own bookkeeping (stability windows, pulse tracking).
pub async fn poll_until<F>(
    scheduler: &dyn Scheduler,
    deadline: Deadline,
    settle: Jitter,
    mut condition: F,
) -> Result<(), DeadlineElapsed>
where
    F: FnMut() -> bool + Send,
{
    loop {
        if condition() {
            scheduler.sleep(settle.sample()).await;
            return Ok(());
        }

        let now = scheduler.now();
        if deadline.is_past(now) {
            return Err(DeadlineElapsed {
                waited: deadline.elapsed(now),
            });
        }

        trace!("waiting...");
        scheduler.next_tick().await;
    }
}
