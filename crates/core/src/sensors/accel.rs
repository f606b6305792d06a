//! Accelerometer zeroing and pitch
//!
//! The robot only needs pitch, to notice the ramp. Zeroing is a one-shot
//! procedure on level ground: whatever the sensor reads beyond a pure
//! gravity vector along +Z is treated as offset.

use libm::{atan2f, sqrtf};
use nalgebra::Vector3;

use crate::error::CalibrationError;

/// Minimum number of stationary samples for zeroing
pub const MIN_ACCEL_SAMPLES: usize = 16;

/// Mean magnitudes below this are not a plausible gravity vector (m/s²)
const MIN_GRAVITY: f32 = 1.0;

const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Accelerometer zero offset (m/s²)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelCalibration {
    pub offset: Vector3<f32>,
}

impl Default for AccelCalibration {
    fn default() -> Self {
        Self {
            offset: Vector3::zeros(),
        }
    }
}

impl AccelCalibration {
    /// `calibrated = raw - offset`
    pub fn apply(&self, raw: Vector3<f32>) -> Vector3<f32> {
        raw - self.offset
    }

    /// Pitch of a raw reading after offset removal.
    pub fn pitch_deg(&self, raw: Vector3<f32>) -> f32 {
        pitch_deg(self.apply(raw))
    }
}

/// Pitch angle in degrees, positive nose-up: `atan2(ax, sqrt(ay² + az²))`.
pub fn pitch_deg(accel: Vector3<f32>) -> f32 {
    let horizontal = sqrtf(accel.y * accel.y + accel.z * accel.z);
    atan2f(accel.x, horizontal) * RAD_TO_DEG
}

/// Running mean of stationary samples
#[derive(Debug, Clone, Default)]
pub struct AccelCalibrator {
    sum: Vector3<f32>,
    count: usize,
}

impl AccelCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, raw: Vector3<f32>) {
        if raw.iter().all(|v| v.is_finite()) {
            self.sum += raw;
            self.count += 1;
        }
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }

    /// `offset = mean - (0, 0, |mean|)`
    pub fn finish(&self) -> Result<AccelCalibration, CalibrationError> {
        if self.count < MIN_ACCEL_SAMPLES {
            return Err(CalibrationError::NotEnoughSamples {
                got: self.count,
                needed: MIN_ACCEL_SAMPLES,
            });
        }

        let mean = self.sum / self.count as f32;
        let gravity = mean.norm();
        if gravity < MIN_GRAVITY {
            return Err(CalibrationError::DegenerateAxis { axis: "accel" });
        }

        Ok(AccelCalibration {
            offset: mean - Vector3::new(0.0, 0.0, gravity),
        })
    }
}
