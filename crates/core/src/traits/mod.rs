//! Platform abstractions
//!
//! Trait definitions are pure and carry no feature gates. Hardware and
//! simulator implementations live in the firmware and sitl crates.

pub mod sensors;
pub mod time;

pub use crate::motor::MotorDriver;
pub use sensors::{
    Accelerometer, Button, ColorSensor, Magnetometer, RangeSensor, RobotPlatform,
};
pub use time::{MockTime, TimeSource};
