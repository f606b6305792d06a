//! Peripheral interfaces consumed by the control loop
//!
//! Drivers never fail from the caller's point of view: a range timeout is
//! `None`, everything else returns the last value the peripheral produced.

use embedded_hal::delay::DelayNs;
use nalgebra::{Vector2, Vector3};

use crate::motor::MotorDriver;
use crate::sensors::RgbSample;

/// Horizontal magnetometer axes (raw units)
pub trait Magnetometer {
    fn read_mag(&mut self) -> Vector2<f32>;
}

/// RGB floor color sensor
pub trait ColorSensor {
    fn read_rgb(&mut self) -> RgbSample;
}

/// Ultrasonic range sensor
pub trait RangeSensor {
    /// Echo round-trip time in microseconds, `None` on timeout.
    fn read_echo_us(&mut self) -> Option<u32>;
}

/// Three-axis accelerometer (m/s²)
pub trait Accelerometer {
    fn read_accel(&mut self) -> Vector3<f32>;
}

/// Debounced user button
pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

/// Everything the robot needs from its hardware, in one place.
///
/// The delay is used only by the blocking calibration routines before the
/// control loop starts.
pub trait RobotPlatform: DelayNs {
    type Motors: MotorDriver;
    type Mag: Magnetometer;
    type Color: ColorSensor;
    type Range: RangeSensor;
    type Accel: Accelerometer;
    type Btn: Button;

    fn motors(&mut self) -> &mut Self::Motors;
    fn magnetometer(&mut self) -> &mut Self::Mag;
    fn color_sensor(&mut self) -> &mut Self::Color;
    fn range_sensor(&mut self) -> &mut Self::Range;
    fn accelerometer(&mut self) -> &mut Self::Accel;
    fn button(&mut self) -> &mut Self::Btn;
}
