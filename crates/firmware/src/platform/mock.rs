//! Scripted mock platform for host testing
//!
//! Sensors return queued readings first and fall back to a default once the
//! queue is empty. Delays advance an internal clock and turn the mock
//! magnetometer according to the last motor command, so a rotate-in-place
//! sweep produces a full magnetometer circle.
//!
//! ```ignore
//! use zumo_cup_firmware::platform::MockPlatform;
//!
//! let mut platform = MockPlatform::new();
//! platform.button.push(false);
//! platform.button.push(true);
//! ```

use embedded_hal::delay::DelayNs;
use heapless::Deque;
use libm::{cosf, sinf};
use nalgebra::{Vector2, Vector3};
use zumo_cup_core::heading::wrap_360;
use zumo_cup_core::motor::{MotorCommand, MotorDriver};
use zumo_cup_core::sensors::RgbSample;
use zumo_cup_core::traits::{
    Accelerometer, Button, ColorSensor, Magnetometer, RangeSensor, RobotPlatform,
};

/// Queue depth for scripted readings
pub const MOCK_QUEUE_SIZE: usize = 64;

/// Degrees per ms per unit of (left - right)
const DEFAULT_TURN_RATE: f32 = 0.0006;

/// Records the last command written to the motors
#[derive(Debug, Default)]
pub struct MockMotors {
    command: MotorCommand,
    writes: u32,
}

impl MockMotors {
    pub fn command(&self) -> MotorCommand {
        self.command
    }

    /// Number of `set_speeds` calls so far
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl MotorDriver for MockMotors {
    fn set_speeds(&mut self, command: MotorCommand) {
        self.command = command;
        self.writes += 1;
    }
}

/// Magnetometer with a configurable hard-iron offset and axis scale
#[derive(Debug)]
pub struct MockMagnetometer {
    pub heading_deg: f32,
    pub hard_iron: Vector2<f32>,
    pub scale: Vector2<f32>,
}

impl Default for MockMagnetometer {
    fn default() -> Self {
        Self {
            heading_deg: 0.0,
            hard_iron: Vector2::zeros(),
            scale: Vector2::new(1.0, 1.0),
        }
    }
}

impl Magnetometer for MockMagnetometer {
    fn read_mag(&mut self) -> Vector2<f32> {
        let rad = self.heading_deg * core::f32::consts::PI / 180.0;
        Vector2::new(
            self.hard_iron.x + self.scale.x * cosf(rad),
            self.hard_iron.y + self.scale.y * sinf(rad),
        )
    }
}

/// Scripted reading queue with a fallback value
#[derive(Debug)]
pub struct Scripted<T: Copy> {
    queue: Deque<T, MOCK_QUEUE_SIZE>,
    default: T,
}

impl<T: Copy> Scripted<T> {
    pub fn new(default: T) -> Self {
        Self {
            queue: Deque::new(),
            default,
        }
    }

    /// Queue a reading; silently dropped when the queue is full
    pub fn push(&mut self, value: T) {
        let _ = self.queue.push_back(value);
    }

    pub fn set_default(&mut self, value: T) {
        self.default = value;
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn next(&mut self) -> T {
        self.queue.pop_front().unwrap_or(self.default)
    }
}

pub type MockColorSensor = Scripted<RgbSample>;
pub type MockRangeSensor = Scripted<Option<u32>>;
pub type MockButton = Scripted<bool>;

impl ColorSensor for MockColorSensor {
    fn read_rgb(&mut self) -> RgbSample {
        self.next()
    }
}

impl RangeSensor for MockRangeSensor {
    fn read_echo_us(&mut self) -> Option<u32> {
        self.next()
    }
}

impl Button for MockButton {
    fn is_pressed(&mut self) -> bool {
        self.next()
    }
}

#[derive(Debug)]
pub struct MockAccelerometer {
    pub reading: Vector3<f32>,
}

impl Default for MockAccelerometer {
    fn default() -> Self {
        Self {
            reading: Vector3::new(0.0, 0.0, 9.81),
        }
    }
}

impl Accelerometer for MockAccelerometer {
    fn read_accel(&mut self) -> Vector3<f32> {
        self.reading
    }
}

/// Mock robot: white floor, level, nothing in range, button released
#[derive(Debug)]
pub struct MockPlatform {
    pub motors: MockMotors,
    pub mag: MockMagnetometer,
    pub color: MockColorSensor,
    pub range: MockRangeSensor,
    pub accel: MockAccelerometer,
    pub button: MockButton,
    /// Heading change in degrees per ms per unit of (left - right)
    pub turn_rate: f32,
    elapsed_ns: u64,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            motors: MockMotors::default(),
            mag: MockMagnetometer::default(),
            color: Scripted::new(RgbSample::new(255, 255, 255)),
            range: Scripted::new(None),
            accel: MockAccelerometer::default(),
            button: Scripted::new(false),
            turn_rate: DEFAULT_TURN_RATE,
            elapsed_ns: 0,
        }
    }

    /// Total time spent in delays (ms)
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayNs for MockPlatform {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
        let command = self.motors.command();
        let differential = f32::from(command.left) - f32::from(command.right);
        let dt_ms = ns as f32 / 1_000_000.0;
        self.mag.heading_deg = wrap_360(self.mag.heading_deg + differential * self.turn_rate * dt_ms);
    }
}

impl RobotPlatform for MockPlatform {
    type Motors = MockMotors;
    type Mag = MockMagnetometer;
    type Color = MockColorSensor;
    type Range = MockRangeSensor;
    type Accel = MockAccelerometer;
    type Btn = MockButton;

    fn motors(&mut self) -> &mut MockMotors {
        &mut self.motors
    }

    fn magnetometer(&mut self) -> &mut MockMagnetometer {
        &mut self.mag
    }

    fn color_sensor(&mut self) -> &mut MockColorSensor {
        &mut self.color
    }

    fn range_sensor(&mut self) -> &mut MockRangeSensor {
        &mut self.range
    }

    fn accelerometer(&mut self) -> &mut MockAccelerometer {
        &mut self.accel
    }

    fn button(&mut self) -> &mut MockButton {
        &mut self.button
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_falls_back_to_default() {
        let mut platform = MockPlatform::new();
        platform.range.push(Some(1000));
        assert_eq!(platform.range_sensor().read_echo_us(), Some(1000));
        assert_eq!(platform.range_sensor().read_echo_us(), None);
        assert_eq!(platform.range.remaining(), 0);
    }

    #[test]
    fn test_delay_turns_with_motors() {
        let mut platform = MockPlatform::new();
        platform.motors().set_speeds(MotorCommand::rotate(100));
        // (100 - -100) * 0.0006 * 100 ms = 12 degrees clockwise
        platform.delay_ms(100);
        assert!((platform.mag.heading_deg - 12.0).abs() < 1e-3);
        assert_eq!(platform.elapsed_ms(), 100);
        assert_eq!(platform.motors.writes(), 1);
    }

    #[test]
    fn test_mag_applies_hard_iron() {
        let mut platform = MockPlatform::new();
        platform.mag.hard_iron = Vector2::new(5.0, -3.0);
        platform.mag.heading_deg = 90.0;
        let m = platform.magnetometer().read_mag();
        assert!((m.x - 5.0).abs() < 1e-4);
        assert!((m.y - -2.0).abs() < 1e-4);
    }
}
