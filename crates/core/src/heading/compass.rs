//! Compass heading estimation
//!
//! Turns raw 2-axis magnetometer samples into a declination-corrected,
//! filtered heading:
//!
//! ```text
//! raw ─► (raw - hard_iron_offset) .* axis_scale ─► atan2(y, x) + declination
//!     ─► wrap [0, 360) ─► circular-mean filter ─► heading
//! ```

use nalgebra::Vector2;

use super::angle::{heading_from_vector, wrap_360};
use super::filter::{HeadingFilter, HEADING_FILTER_SIZE};
use crate::error::CalibrationError;

/// Minimum number of samples a calibration sweep must contain
pub const MIN_COMPASS_SAMPLES: usize = 8;

/// Smallest per-axis span accepted from a sweep (raw units)
const MIN_AXIS_SPAN: f32 = 1e-3;

/// Hard-iron offset and per-axis scale for the magnetometer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompassCalibration {
    /// Hard-iron offset, subtracted from raw readings
    pub offset: Vector2<f32>,
    /// Per-axis scale applied after offset removal
    pub scale: Vector2<f32>,
}

impl Default for CompassCalibration {
    /// Identity calibration (offset zero, scale one)
    fn default() -> Self {
        Self {
            offset: Vector2::zeros(),
            scale: Vector2::new(1.0, 1.0),
        }
    }
}

impl CompassCalibration {
    /// Apply calibration: `(raw - offset) .* scale`
    pub fn apply(&self, raw: Vector2<f32>) -> Vector2<f32> {
        (raw - self.offset).component_mul(&self.scale)
    }
}

/// Accumulates per-axis extrema during a 360° calibration sweep
#[derive(Debug, Clone)]
pub struct CompassCalibrator {
    min: Vector2<f32>,
    max: Vector2<f32>,
    count: usize,
}

impl CompassCalibrator {
    pub fn new() -> Self {
        Self {
            min: Vector2::new(f32::MAX, f32::MAX),
            max: Vector2::new(f32::MIN, f32::MIN),
            count: 0,
        }
    }

    /// Record one raw sample. Non-finite samples are ignored.
    pub fn add_sample(&mut self, raw: Vector2<f32>) {
        if !raw.x.is_finite() || !raw.y.is_finite() {
            return;
        }
        self.min = self.min.inf(&raw);
        self.max = self.max.sup(&raw);
        self.count += 1;
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }

    /// Compute the calibration from the recorded extrema.
    ///
    /// Offset is the midpoint of each axis; scale equalizes both spans to
    /// their average.
    pub fn finish(&self) -> Result<CompassCalibration, CalibrationError> {
        if self.count < MIN_COMPASS_SAMPLES {
            return Err(CalibrationError::NotEnoughSamples {
                got: self.count,
                needed: MIN_COMPASS_SAMPLES,
            });
        }

        let span = self.max - self.min;
        if span.x < MIN_AXIS_SPAN {
            return Err(CalibrationError::DegenerateAxis { axis: "mag_x" });
        }
        if span.y < MIN_AXIS_SPAN {
            return Err(CalibrationError::DegenerateAxis { axis: "mag_y" });
        }

        let avg_span = (span.x + span.y) / 2.0;
        Ok(CompassCalibration {
            offset: (self.max + self.min) / 2.0,
            scale: Vector2::new(avg_span / span.x, avg_span / span.y),
        })
    }
}

impl Default for CompassCalibrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Calibrated, declination-corrected and filtered compass heading
pub struct CompassEstimator<const N: usize = HEADING_FILTER_SIZE> {
    calibration: CompassCalibration,
    declination_deg: f32,
    filter: HeadingFilter<N>,
    raw_heading: f32,
}

impl<const N: usize> CompassEstimator<N> {
    pub fn new(declination_deg: f32) -> Self {
        Self {
            calibration: CompassCalibration::default(),
            declination_deg,
            filter: HeadingFilter::new(),
            raw_heading: 0.0,
        }
    }

    /// Replace the calibration. The filter is flushed since old samples were
    /// computed with the previous constants.
    pub fn set_calibration(&mut self, calibration: CompassCalibration) {
        self.calibration = calibration;
        self.filter.reset();
    }

    pub fn calibration(&self) -> &CompassCalibration {
        &self.calibration
    }

    /// Unfiltered heading for one raw sample.
    pub fn raw_heading_for(&self, raw: Vector2<f32>) -> f32 {
        let cal = self.calibration.apply(raw);
        wrap_360(heading_from_vector(cal.x, cal.y) + self.declination_deg)
    }

    /// Feed one raw magnetometer sample; returns the filtered heading.
    pub fn update(&mut self, raw: Vector2<f32>) -> f32 {
        self.raw_heading = self.raw_heading_for(raw);
        self.filter.apply(self.raw_heading)
    }

    /// Filtered heading in [0, 360).
    pub fn heading(&self) -> f32 {
        self.filter.output()
    }

    /// Latest unfiltered heading in [0, 360).
    pub fn raw_heading(&self) -> f32 {
        self.raw_heading
    }
}
