//! Throttle: at most one poll cycle at a time, and not too often.

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// Guards a sensor's poll cycle.
///
/// A tick is admitted only when no cycle is running and at least
/// `min_interval` has passed since the previous admitted tick started.
/// Refused ticks are dropped, never queued.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

/// Proof that a cycle was admitted; the throttle stays busy until it drops.
#[derive(Debug)]
pub struct ThrottlePermit<'a> {
    _guard: MutexGuard<'a, Option<Instant>>,
}

impl Throttle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: Mutex::new(None),
        }
    }

    /// Admit a regular tick, or `None` when it must be dropped.
    pub fn try_begin(&self) -> Option<ThrottlePermit<'_>> {
        self.admit(false)
    }

    /// Admit a tick regardless of the minimum interval, still refusing to
    /// overlap a running cycle.
    pub fn try_begin_forced(&self) -> Option<ThrottlePermit<'_>> {
        self.admit(true)
    }

    /// Whether a cycle is currently running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.last_start.try_lock().is_err()
    }

    fn admit(&self, force: bool) -> Option<ThrottlePermit<'_>> {
        let mut guard = self.last_start.try_lock().ok()?;
        let now = Instant::now();
        if !force
            && let Some(last) = *guard
            && now.duration_since(last) < self.min_interval
        {
            return None;
        }
        *guard = Some(now);
        Some(ThrottlePermit { _guard: guard })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test(start_paused = true)]
    async fn should_admit_first_tick() {
        let throttle = Throttle::new(HOUR);
        assert!(throttle.try_begin().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn should_drop_tick_while_cycle_is_running() {
        let throttle = Throttle::new(Duration::ZERO);
        let permit = throttle.try_begin();
        assert!(permit.is_some());
        assert!(throttle.is_busy());

        assert!(throttle.try_begin().is_none());
        assert!(throttle.try_begin_forced().is_none());

        drop(permit);
        assert!(!throttle.is_busy());
        assert!(throttle.try_begin().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn should_drop_tick_within_min_interval() {
        let throttle = Throttle::new(HOUR);
        drop(throttle.try_begin());

        tokio::time::advance(Duration::from_secs(30 * 60)).await;
        assert!(throttle.try_begin().is_none());

        tokio::time::advance(Duration::from_secs(30 * 60)).await;
        assert!(throttle.try_begin().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn should_let_forced_tick_skip_min_interval() {
        let throttle = Throttle::new(HOUR);
        drop(throttle.try_begin());

        assert!(throttle.try_begin().is_none());
        assert!(throttle.try_begin_forced().is_some());
    }
}
