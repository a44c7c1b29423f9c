//! Rate limiting logic and state management.

mod clock;
mod gate;
mod window;

#[cfg(any(test, feature = "test-helpers"))]
pub use clock::MockClock;
pub use clock::{Clock, SystemClock};
pub use gate::{AdmissionGate, Decision, GateSnapshot, GateStats, RateLimitConfig};
pub use window::{TimeUnit, WindowTracker};
