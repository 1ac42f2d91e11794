//! Wall-clock source for change timestamps
//!
//! Changes record the time they were made. The [`Clock`] trait lets tests
//! replace the system clock with a deterministic one.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

/// A time provider for change timestamps
pub trait Clock: Send + Sync + Debug {
    /// Current time as milliseconds since the unix epoch
    fn now_millis(&self) -> i64;
}

/// Production clock using real system time
///
/// Reads `Date.now()` when running as WASM in a browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Deterministic clock that advances by one millisecond per reading
///
/// # Example
///
/// ```
/// use convergent_core::time::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// assert_eq!(clock.now_millis(), 1000);
/// assert_eq!(clock.now_millis(), 1001);
/// ```
#[derive(Debug)]
pub struct FixedClock {
    next: AtomicI64,
}

impl FixedClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            next: AtomicI64::new(start_millis),
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
