//! Control Loop Task
//!
//! Drives [`ControlLoop::tick`] at 50 Hz from an embassy ticker.
//!
//! Embassy tasks cannot be generic, so the board binary wraps this in its
//! own `#[embassy_executor::task]` with the concrete platform type:
//!
//! ```rust,ignore
//! #[embassy_executor::task]
//! async fn control_task(control: ControlLoop<ZumoBoard, EmbassyTime>) {
//!     zumo_cup_firmware::tasks::run(control).await
//! }
//! ```

use embassy_time::{Duration, Ticker};
use zumo_cup_core::traits::RobotPlatform;

use crate::platform::EmbassyTime;
use crate::robot::ControlLoop;

/// Control cycle period (ms)
pub const CONTROL_PERIOD_MS: u64 = 20;

/// Run the control loop forever.
pub async fn run<P: RobotPlatform>(mut control: ControlLoop<P, EmbassyTime>) {
    crate::log_info!("Control loop task started");
    crate::log_info!("  Initial mode: {}", control.behavior().mode().name());

    let mut ticker = Ticker::every(Duration::from_millis(CONTROL_PERIOD_MS));
    loop {
        control.tick();
        ticker.next().await;
    }
}
