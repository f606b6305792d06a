//! Simulated clock for SITL.
//!
//! Wraps a shared atomic counter for simulation time, allowing the
//! simulator and the control loop to share a consistent time reference.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use zumo_cup_core::traits::TimeSource;

/// Simulated millisecond clock backed by a shared atomic counter.
///
/// Multiple clones share the same underlying counter, enabling the
/// simulator to advance time while the control loop reads it.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    time_ms: Arc<AtomicU64>,
}

impl SimClock {
    /// Create a new clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance simulation time by the given number of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.time_ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Set simulation time to an absolute value.
    pub fn set_ms(&self, ms: u64) {
        self.time_ms.store(ms, Ordering::Relaxed);
    }
}

impl TimeSource for SimClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(Ordering::Relaxed)
    }
}
