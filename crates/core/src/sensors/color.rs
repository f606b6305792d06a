//! Floor color classification
//!
//! Raw RGB intensities are normalized per channel against an operator
//! calibration sweep, then classified:
//!
//! 1. BLACK - every channel at or below `black_max`
//! 2. WHITE - every channel at or above `white_min`
//! 3. RED / BLUE - one channel at or above `dominant_min` and ahead of both
//!    other channels by `dominance_margin`
//! 4. OTHER - anything else ("no signal")
//!
//! BLACK and WHITE are tested first so a bright white floor is never mistaken
//! for a dominant channel.

use core::fmt;

use crate::error::CalibrationError;

/// Minimum number of samples a color sweep must contain
pub const MIN_COLOR_SAMPLES: usize = 8;

/// Raw color sensor reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbSample {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl RgbSample {
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    fn channels(&self) -> [u16; 3] {
        [self.r, self.g, self.b]
    }
}

/// Discrete floor color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorClass {
    White,
    Black,
    Red,
    Blue,
    Other,
}

impl ColorClass {
    pub fn name(&self) -> &'static str {
        match self {
            ColorClass::White => "WHITE",
            ColorClass::Black => "BLACK",
            ColorClass::Red => "RED",
            ColorClass::Blue => "BLUE",
            ColorClass::Other => "OTHER",
        }
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-channel extrema from the last calibration sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCalibration {
    /// Channel minima (r, g, b)
    pub min: [u16; 3],
    /// Channel maxima (r, g, b)
    pub max: [u16; 3],
}

impl Default for ColorCalibration {
    fn default() -> Self {
        Self {
            min: [60, 52, 62],
            max: [255, 255, 255],
        }
    }
}

impl ColorCalibration {
    /// Normalize a raw reading to [0, 1] per channel.
    ///
    /// A channel with `max <= min` cannot be scaled; it reads 0.0 at or
    /// below `min` and 1.0 above it.
    pub fn normalize(&self, raw: RgbSample) -> [f32; 3] {
        let mut out = [0.0; 3];
        for (i, &value) in raw.channels().iter().enumerate() {
            let (lo, hi) = (self.min[i], self.max[i]);
            out[i] = if hi <= lo {
                if value <= lo {
                    0.0
                } else {
                    1.0
                }
            } else {
                ((value as f32 - lo as f32) / (hi as f32 - lo as f32)).clamp(0.0, 1.0)
            };
        }
        out
    }
}

/// Classification thresholds on normalized channels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorThresholds {
    pub black_max: f32,
    pub white_min: f32,
    pub dominant_min: f32,
    pub dominance_margin: f32,
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            black_max: 0.2,
            white_min: 0.8,
            dominant_min: 0.45,
            dominance_margin: 0.2,
        }
    }
}

/// Classify a normalized `[r, g, b]` triple.
pub fn classify(rgb: [f32; 3], thresholds: &ColorThresholds) -> ColorClass {
    let [r, g, b] = rgb;

    if rgb.iter().all(|&c| c <= thresholds.black_max) {
        return ColorClass::Black;
    }
    if rgb.iter().all(|&c| c >= thresholds.white_min) {
        return ColorClass::White;
    }

    let dominant = |c: f32, o1: f32, o2: f32| {
        c >= thresholds.dominant_min && c - o1.max(o2) >= thresholds.dominance_margin
    };
    if dominant(r, g, b) {
        ColorClass::Red
    } else if dominant(b, r, g) {
        ColorClass::Blue
    } else {
        ColorClass::Other
    }
}

/// Accumulates channel extrema during an operator calibration sweep
#[derive(Debug, Clone)]
pub struct ColorCalibrator {
    min: [u16; 3],
    max: [u16; 3],
    count: usize,
}

impl ColorCalibrator {
    pub fn new() -> Self {
        Self {
            min: [u16::MAX; 3],
            max: [0; 3],
            count: 0,
        }
    }

    pub fn add_sample(&mut self, raw: RgbSample) {
        for (i, &value) in raw.channels().iter().enumerate() {
            self.min[i] = self.min[i].min(value);
            self.max[i] = self.max[i].max(value);
        }
        self.count += 1;
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }

    /// Produce a fresh calibration. Previous extrema are never merged in.
    pub fn finish(&self) -> Result<ColorCalibration, CalibrationError> {
        if self.count < MIN_COLOR_SAMPLES {
            return Err(CalibrationError::NotEnoughSamples {
                got: self.count,
                needed: MIN_COLOR_SAMPLES,
            });
        }
        Ok(ColorCalibration {
            min: self.min,
            max: self.max,
        })
    }
}

impl Default for ColorCalibrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Current and previous color class, for edge-triggered decisions
#[derive(Debug, Clone)]
pub struct ColorTracker {
    calibration: ColorCalibration,
    thresholds: ColorThresholds,
    normalized: [f32; 3],
    current: ColorClass,
    previous: ColorClass,
}

impl ColorTracker {
    pub fn new(thresholds: ColorThresholds) -> Self {
        Self {
            calibration: ColorCalibration::default(),
            thresholds,
            normalized: [0.0; 3],
            current: ColorClass::Other,
            previous: ColorClass::Other,
        }
    }

    /// Overwrite the calibration (never accumulated).
    pub fn set_calibration(&mut self, calibration: ColorCalibration) {
        self.calibration = calibration;
    }

    pub fn calibration(&self) -> &ColorCalibration {
        &self.calibration
    }

    /// Classify a new reading, shifting the current class into `previous`.
    pub fn update(&mut self, raw: RgbSample) -> ColorClass {
        self.normalized = self.calibration.normalize(raw);
        self.previous = self.current;
        self.current = classify(self.normalized, &self.thresholds);
        self.current
    }

    pub fn current(&self) -> ColorClass {
        self.current
    }

    pub fn previous(&self) -> ColorClass {
        self.previous
    }

    pub fn normalized(&self) -> [f32; 3] {
        self.normalized
    }

    /// True on the first reading of `class` after any other class.
    pub fn entered(&self, class: ColorClass) -> bool {
        self.current == class && self.previous != class
    }

    /// True when the last update moved from `from` directly to `to`.
    pub fn crossed(&self, from: ColorClass, to: ColorClass) -> bool {
        self.previous == from && self.current == to
    }
}
