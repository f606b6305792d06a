//! Operator-supervised calibration routines
//!
//! Each routine waits for a button press, then samples one sensor while the
//! robot (compass) or the operator (color) sweeps through its range:
//!
//! 1. **Compass**: the robot rotates in place for `compass_sweep_ms`
//! 2. **Color**: the operator slides the robot across every floor color
//! 3. **Accelerometer**: the robot rests on a level surface
//!
//! Routines are blocking and run before the control loop starts. A failed
//! routine leaves the previous calibration in place.

use zumo_cup_core::behavior::Behavior;
use zumo_cup_core::error::CalibrationError;
use zumo_cup_core::heading::{CompassCalibration, CompassCalibrator};
use zumo_cup_core::motor::{MotorCommand, MotorDriver};
use zumo_cup_core::sensors::{AccelCalibration, AccelCalibrator, ColorCalibration, ColorCalibrator};
use zumo_cup_core::traits::{Accelerometer, Button, ColorSensor, Magnetometer, RobotPlatform};

use super::button::ButtonEdge;
#[cfg(any(test, feature = "pico2_w"))]
use crate::core::logging::to_line;

/// Timing and speed settings for the calibration routines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Sampling and button polling period (ms)
    pub sample_interval_ms: u32,
    /// Duration of the rotate-in-place compass sweep (ms)
    pub compass_sweep_ms: u32,
    /// Rotation speed during the compass sweep
    pub rotate_speed: i16,
    /// Duration of the color sweep (ms)
    pub color_sweep_ms: u32,
    /// Number of stationary accelerometer samples
    pub accel_samples: usize,
    /// Give up waiting for the operator after this long; `None` waits forever
    pub button_timeout_ms: Option<u32>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 20,
            compass_sweep_ms: 4000,
            rotate_speed: 140,
            color_sweep_ms: 3000,
            accel_samples: 32,
            button_timeout_ms: None,
        }
    }
}

/// Outcome of a full calibration run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    pub compass: Result<CompassCalibration, CalibrationError>,
    pub color: Result<ColorCalibration, CalibrationError>,
    pub accel: Result<AccelCalibration, CalibrationError>,
}

impl CalibrationReport {
    /// Install every successful calibration, returning how many were applied.
    pub fn apply(&self, behavior: &mut Behavior) -> usize {
        let mut applied = 0;
        if let Ok(calibration) = self.compass {
            behavior.set_compass_calibration(calibration);
            applied += 1;
        }
        if let Ok(calibration) = self.color {
            behavior.set_color_calibration(calibration);
            applied += 1;
        }
        if let Ok(calibration) = self.accel {
            behavior.set_accel_calibration(calibration);
            applied += 1;
        }
        applied
    }

    pub fn is_complete(&self) -> bool {
        self.compass.is_ok() && self.color.is_ok() && self.accel.is_ok()
    }
}

/// Runs the calibration routines on a borrowed platform
pub struct Calibrator<'a, P: RobotPlatform> {
    platform: &'a mut P,
    config: CalibrationConfig,
    button: ButtonEdge,
}

impl<'a, P: RobotPlatform> Calibrator<'a, P> {
    pub fn new(platform: &'a mut P, config: CalibrationConfig) -> Self {
        Self {
            platform,
            config,
            button: ButtonEdge::new(),
        }
    }

    /// Block until the button is pressed.
    pub fn wait_for_button(&mut self) -> Result<(), CalibrationError> {
        let mut waited_ms: u32 = 0;
        loop {
            let pressed = self.platform.button().is_pressed();
            if self.button.update(pressed) {
                return Ok(());
            }
            if let Some(timeout) = self.config.button_timeout_ms {
                if waited_ms >= timeout {
                    return Err(CalibrationError::Cancelled);
                }
            }
            self.platform.delay_ms(self.config.sample_interval_ms);
            waited_ms = waited_ms.saturating_add(self.config.sample_interval_ms);
        }
    }

    fn sweep_samples(&self, duration_ms: u32) -> u32 {
        duration_ms / self.config.sample_interval_ms.max(1)
    }

    /// Rotate in place and record magnetometer extrema.
    pub fn compass(&mut self) -> Result<CompassCalibration, CalibrationError> {
        crate::log_info!("Compass calibration: press button to start rotation");
        self.wait_for_button()?;

        let mut calibrator = CompassCalibrator::new();
        let samples = self.sweep_samples(self.config.compass_sweep_ms);

        self.platform
            .motors()
            .set_speeds(MotorCommand::rotate(self.config.rotate_speed));
        for _ in 0..samples {
            calibrator.add_sample(self.platform.magnetometer().read_mag());
            self.platform.delay_ms(self.config.sample_interval_ms);
        }
        self.platform.motors().stop();

        calibrator.finish()
    }

    /// Record color channel extrema while the operator moves the robot.
    pub fn color(&mut self) -> Result<ColorCalibration, CalibrationError> {
        crate::log_info!("Color calibration: press button, then sweep over every color");
        self.wait_for_button()?;

        let mut calibrator = ColorCalibrator::new();
        for _ in 0..self.sweep_samples(self.config.color_sweep_ms) {
            calibrator.add_sample(self.platform.color_sensor().read_rgb());
            self.platform.delay_ms(self.config.sample_interval_ms);
        }

        calibrator.finish()
    }

    /// Average stationary accelerometer readings into a zero offset.
    pub fn accel(&mut self) -> Result<AccelCalibration, CalibrationError> {
        crate::log_info!("Accelerometer calibration: place robot level and press button");
        self.wait_for_button()?;

        let mut calibrator = AccelCalibrator::new();
        for _ in 0..self.config.accel_samples {
            calibrator.add_sample(self.platform.accelerometer().read_accel());
            self.platform.delay_ms(self.config.sample_interval_ms);
        }

        calibrator.finish()
    }

    /// Run compass, color and accelerometer routines in order.
    pub fn run_all(&mut self) -> CalibrationReport {
        let report = CalibrationReport {
            compass: self.compass(),
            color: self.color(),
            accel: self.accel(),
        };

        for (_name, result) in [
            ("compass", report.compass.err()),
            ("color", report.color.err()),
            ("accel", report.accel.err()),
        ] {
            match result {
                Some(_e) => {
                    crate::log_warn!(
                        "{} calibration failed, keeping previous: {}",
                        _name,
                        to_line(&_e).as_str()
                    );
                }
                None => crate::log_info!("{} calibration done", _name),
            }
        }

        report
    }
}
