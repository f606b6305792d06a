//! Heading estimation
//!
//! Angle utilities, the circular-mean filter and the calibrated compass
//! estimator used by the controller and the stall detector.

pub mod angle;
pub mod compass;
pub mod filter;

pub use angle::{circular_mean, heading_error, heading_from_vector, wrap_180, wrap_360};
pub use compass::{CompassCalibration, CompassCalibrator, CompassEstimator, MIN_COMPASS_SAMPLES};
pub use filter::{HeadingFilter, HEADING_FILTER_SIZE};
