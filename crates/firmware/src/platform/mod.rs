//! Platform implementations
//!
//! Hardware drivers live with the board support code; this module provides
//! the embassy time source and a scripted mock platform for host tests.

pub mod mock;

#[cfg(feature = "pico2_w")]
pub mod time;

pub use mock::{
    MockAccelerometer, MockButton, MockColorSensor, MockMagnetometer, MockMotors, MockPlatform,
    MockRangeSensor,
};

#[cfg(feature = "pico2_w")]
pub use time::EmbassyTime;
