//! Embassy-based time source implementation.
//!
//! This module provides the `EmbassyTime` implementation of the
//! `TimeSource` trait using Embassy's time driver.

use zumo_cup_core::traits::TimeSource;

/// Embassy-based time source using the Embassy time driver.
///
/// # Example
///
/// ```ignore
/// use zumo_cup_firmware::platform::EmbassyTime;
/// use zumo_cup_core::traits::TimeSource;
///
/// let time = EmbassyTime;
/// let now = time.now_ms();
/// ```
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}
