//! Monotonic time sources for the admission gate.
//!
//! The gate only ever reads time through [`Clock`], so window arithmetic is
//! immune to wall-clock adjustments and can be driven deterministically in
//! tests with `MockClock` (available in test builds or with the
//! `test-helpers` feature).

use std::fmt::Debug;
use std::time::Instant;

/// A monotonic time source.
pub trait Clock: Send + Sync + Debug {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// System clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-helpers"))]
mod mock {
    use super::Clock;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Clock whose time only moves when a test moves it.
    ///
    /// Clones share the same underlying instant, so a clone handed to a gate
    /// can be advanced from the test body.
    #[derive(Debug, Clone)]
    pub struct MockClock {
        current: Arc<Mutex<Instant>>,
    }

    impl MockClock {
        /// Create a mock clock starting at `start`.
        pub fn new(start: Instant) -> Self {
            Self {
                current: Arc::new(Mutex::new(start)),
            }
        }

        /// Move time forward by `by`.
        pub fn advance(&self, by: Duration) {
            *self.current.lock() += by;
        }

        /// Set the clock to a specific instant, possibly in the past.
        pub fn set(&self, instant: Instant) {
            *self.current.lock() = instant;
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new(Instant::now())
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            *self.current.lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.now();

        assert!(t2 > t1);
    }

    #[test]
    fn test_mock_clock_advance_and_set() {
        let start = Instant::now();
        let clock = MockClock::new(start);
        let shared = clock.clone();

        assert_eq!(clock.now(), start);

        shared.advance(Duration::from_secs(10));
        assert_eq!(clock.now(), start + Duration::from_secs(10));

        clock.set(start + Duration::from_secs(3));
        assert_eq!(shared.now(), start + Duration::from_secs(3));
    }
}
