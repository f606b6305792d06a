//! Monotonic millisecond clock abstraction
//!
//! Every cadence-gated component in the core takes `now_ms` as an argument;
//! the control loop obtains it from a `TimeSource`. `EmbassyTime` lives in
//! the firmware crate, `MockTime` is always available for tests.

use core::cell::Cell;

/// Monotonic time since boot.
///
/// # Example
///
/// ```
/// use zumo_cup_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let started = time.now_ms();
/// time.advance(250);
/// assert!(time.elapsed_ms_since(started) >= 200);
/// ```
pub trait TimeSource: Clone {
    /// Milliseconds since start.
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `reference_ms`, zero if the reference is
    /// in the future.
    fn elapsed_ms_since(&self, reference_ms: u64) -> u64 {
        self.now_ms().saturating_sub(reference_ms)
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Clone, Default)]
pub struct MockTime {
    current_ms: Cell<u64>,
}

impl MockTime {
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
        }
    }

    pub fn with_initial(ms: u64) -> Self {
        Self {
            current_ms: Cell::new(ms),
        }
    }

    pub fn set(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get().saturating_add(ms));
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }
}
