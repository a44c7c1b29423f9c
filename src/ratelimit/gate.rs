//! The admission gate: one synchronized decision per submission attempt.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, trace};

use super::clock::{Clock, SystemClock};
use super::window::{TimeUnit, WindowTracker};
use crate::error::{GateError, Result};

/// Validated limit settings for a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    limit: u32,
    window: Duration,
}

impl RateLimitConfig {
    /// Allow `limit` requests per `window`.
    ///
    /// Fails if either value is zero.
    pub fn new(limit: u32, window: Duration) -> Result<Self> {
        if limit == 0 {
            return Err(GateError::Config(
                "request limit must be greater than zero".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(GateError::Config(
                "rate limit window must be greater than zero".to_string(),
            ));
        }
        Ok(Self { limit, window })
    }

    /// Allow `limit` requests per single `unit`.
    pub fn per_unit(limit: u32, unit: TimeUnit) -> Result<Self> {
        Self::from_units(limit, 1, unit)
    }

    /// Allow `limit` requests per `units` × `unit`.
    pub fn from_units(limit: u32, units: u32, unit: TimeUnit) -> Result<Self> {
        let window = unit.span(units).ok_or_else(|| {
            GateError::Config(format!("window of {} {:?} overflows", units, unit))
        })?;
        Self::new(limit, window)
    }

    /// Maximum admitted requests per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Verdict for a single submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// A slot was taken; the call may proceed.
    Admit,
    /// The window is exhausted; the call must not reach the transport.
    Reject,
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admit)
    }
}

/// Point-in-time view of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSnapshot {
    /// Slots taken in the current window
    pub count: u32,
    /// Configured limit
    pub limit: u32,
    /// Slots still available in the current window
    pub remaining: u32,
    /// Time until the current window is over
    pub resets_in: Duration,
}

/// Lifetime decision totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    pub admitted: u64,
    pub rejected: u64,
}

/// Thread-safe gate bounding admissions to `limit` per window.
///
/// The window check, the reset and the count update happen under a single
/// lock. The lock is only held for the decision itself.
#[derive(Debug)]
pub struct AdmissionGate<C: Clock = SystemClock> {
    config: RateLimitConfig,
    state: Mutex<WindowTracker>,
    clock: C,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl AdmissionGate<SystemClock> {
    /// Create a gate on the system monotonic clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> AdmissionGate<C> {
    /// Create a gate reading time from `clock`. The first window opens now.
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Self {
        let tracker = WindowTracker::new(config.window(), clock.now());

        info!(
            limit = config.limit(),
            window = ?config.window(),
            "Admission gate initialized"
        );

        Self {
            config,
            state: Mutex::new(tracker),
            clock,
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Decide whether one more call may proceed in the current window.
    pub fn try_admit(&self) -> Decision {
        let (admitted, count) = {
            let mut state = self.state.lock();
            let now = self.clock.now();

            if state.has_elapsed(now) {
                debug!(window = ?state.window(), "Rate limit window reset");
            }

            (state.try_consume(self.config.limit()), state.count())
        };

        if admitted {
            self.admitted.fetch_add(1, Ordering::Relaxed);
            trace!(count = count, limit = self.config.limit(), "Request admitted");
            Decision::Admit
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(limit = self.config.limit(), "Rate limit exceeded, request rejected");
            Decision::Reject
        }
    }

    /// Current window usage. Applies a pending window reset first.
    pub fn snapshot(&self) -> GateSnapshot {
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.has_elapsed(now);

        let count = state.count();
        GateSnapshot {
            count,
            limit: self.config.limit(),
            remaining: self.config.limit().saturating_sub(count),
            resets_in: state.resets_in(now),
        }
    }

    /// Decision totals since construction.
    pub fn stats(&self) -> GateStats {
        GateStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    /// The limit settings this gate enforces.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::MockClock;
    use std::sync::{Arc, Barrier};
    use std::time::Instant;

    fn gate(limit: u32, window: Duration) -> (AdmissionGate<MockClock>, MockClock) {
        let clock = MockClock::new(Instant::now());
        let config = RateLimitConfig::new(limit, window).unwrap();
        (AdmissionGate::with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn test_config_rejects_zero_limit() {
        let err = RateLimitConfig::new(0, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, GateError::Config(_)));
    }

    #[test]
    fn test_config_rejects_zero_window() {
        assert!(RateLimitConfig::new(5, Duration::ZERO).is_err());
        assert!(RateLimitConfig::from_units(5, 0, TimeUnit::Seconds).is_err());
    }

    #[test]
    fn test_config_per_unit() {
        let config = RateLimitConfig::per_unit(10, TimeUnit::Minutes).unwrap();
        assert_eq!(config.limit(), 10);
        assert_eq!(config.window(), Duration::from_secs(60));
    }

    #[test]
    fn test_admits_up_to_limit() {
        let (gate, _clock) = gate(5, Duration::from_secs(1));

        for _ in 0..5 {
            assert_eq!(gate.try_admit(), Decision::Admit);
        }
    }

    #[test]
    fn test_rejects_beyond_limit() {
        let (gate, _clock) = gate(3, Duration::from_secs(1));

        let admitted = (0..10).filter(|_| gate.try_admit().is_admitted()).count();

        assert_eq!(admitted, 3);
        assert_eq!(gate.stats(), GateStats { admitted: 3, rejected: 7 });
        assert_eq!(gate.snapshot().count, 3);
    }

    #[test]
    fn test_two_per_second_scenario() {
        let (gate, clock) = gate(2, Duration::from_secs(1));

        assert_eq!(gate.try_admit(), Decision::Admit);
        clock.advance(Duration::from_millis(10));
        assert_eq!(gate.try_admit(), Decision::Admit);
        clock.advance(Duration::from_millis(10));
        assert_eq!(gate.try_admit(), Decision::Reject);

        clock.advance(Duration::from_millis(1080));
        assert_eq!(gate.try_admit(), Decision::Admit);
    }

    #[test]
    fn test_exhausted_window_recovers_after_expiry() {
        let (gate, clock) = gate(1, Duration::from_millis(100));

        assert!(gate.try_admit().is_admitted());
        assert!(!gate.try_admit().is_admitted());

        clock.advance(Duration::from_millis(100));
        assert!(gate.try_admit().is_admitted());
        assert_eq!(gate.snapshot().count, 1);
    }

    #[test]
    fn test_clock_going_backward_does_not_reset() {
        let start = Instant::now() + Duration::from_secs(10);
        let clock = MockClock::new(start);
        let config = RateLimitConfig::new(1, Duration::from_secs(1)).unwrap();
        let gate = AdmissionGate::with_clock(config, clock.clone());

        assert!(gate.try_admit().is_admitted());
        clock.set(start - Duration::from_secs(5));
        assert!(!gate.try_admit().is_admitted());
    }

    #[test]
    fn test_snapshot_reports_remaining_and_reset() {
        let (gate, clock) = gate(4, Duration::from_secs(1));
        gate.try_admit();
        clock.advance(Duration::from_millis(250));

        let snapshot = gate.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.remaining, 3);
        assert_eq!(snapshot.resets_in, Duration::from_millis(750));
    }

    #[test]
    fn test_concurrent_callers_never_exceed_limit() {
        const CALLERS: usize = 32;
        const LIMIT: u32 = 7;

        let (gate, _clock) = gate(LIMIT, Duration::from_secs(60));
        let gate = Arc::new(gate);
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    gate.try_admit()
                })
            })
            .collect();

        let decisions: Vec<Decision> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let admitted = decisions.iter().filter(|d| d.is_admitted()).count();

        assert_eq!(admitted, LIMIT as usize);
        assert_eq!(decisions.len() - admitted, CALLERS - LIMIT as usize);
    }
}
