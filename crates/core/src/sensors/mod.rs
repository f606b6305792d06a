//! Sensor interpretation: floor color, range, and pitch

pub mod accel;
pub mod color;
pub mod range;

pub use accel::{pitch_deg, AccelCalibration, AccelCalibrator};
pub use color::{
    classify, ColorCalibration, ColorCalibrator, ColorClass, ColorThresholds, ColorTracker,
    RgbSample,
};
pub use range::{RangeSample, StaticCheck, StaticCheckConfig, StaticVerdict};
