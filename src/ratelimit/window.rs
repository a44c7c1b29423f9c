//! Window bookkeeping for the admission gate.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Granularity of a rate limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Duration of a single unit.
    pub fn unit_duration(&self) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(1),
            TimeUnit::Microseconds => Duration::from_micros(1),
            TimeUnit::Milliseconds => Duration::from_millis(1),
            TimeUnit::Seconds => Duration::from_secs(1),
            TimeUnit::Minutes => Duration::from_secs(60),
            TimeUnit::Hours => Duration::from_secs(3600),
            TimeUnit::Days => Duration::from_secs(86400),
        }
    }

    /// Duration of `units` of this unit, or `None` on overflow.
    pub fn span(&self, units: u32) -> Option<Duration> {
        self.unit_duration().checked_mul(units)
    }
}

/// Start time and admitted count of the current window.
///
/// Pure bookkeeping: the caller supplies `now` and is responsible for
/// serializing access.
#[derive(Debug)]
pub struct WindowTracker {
    window: Duration,
    window_start: Instant,
    count: u32,
}

impl WindowTracker {
    /// Open a fresh window at `now`.
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            count: 0,
        }
    }

    /// Returns `true` if the current window is over, in which case a new
    /// window is opened at `now` with a zero count.
    ///
    /// An instant earlier than the window start counts as no time elapsed, so
    /// the window start never moves backward.
    pub fn has_elapsed(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return false;
        }

        self.window_start = now;
        self.count = 0;
        true
    }

    /// Take one slot if fewer than `limit` have been taken this window.
    pub fn try_consume(&mut self, limit: u32) -> bool {
        if self.count >= limit {
            return false;
        }
        self.count += 1;
        true
    }

    /// Slots taken in the current window.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// When the current window began.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    /// Configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Time left before the current window is over.
    pub fn resets_in(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.window_start);
        self.window.saturating_sub(elapsed)
    }
}
