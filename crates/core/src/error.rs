//! Calibration error types
//!
//! Calibration failures are never fatal: callers keep the previous
//! calibration and report the error to the operator.

use core::fmt;

/// Errors produced when turning a calibration sweep into constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// Too few samples were collected during the sweep
    NotEnoughSamples {
        /// Samples actually collected
        got: usize,
        /// Minimum samples required
        needed: usize,
    },
    /// A sensor axis or channel never changed during the sweep
    DegenerateAxis {
        /// Axis or channel name
        axis: &'static str,
    },
    /// The operator did not start the routine in time
    Cancelled,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::NotEnoughSamples { got, needed } => {
                write!(f, "calibration needs {} samples, got {}", needed, got)
            }
            CalibrationError::DegenerateAxis { axis } => {
                write!(f, "calibration sweep saw no variation on {}", axis)
            }
            CalibrationError::Cancelled => write!(f, "calibration cancelled: no button press"),
        }
    }
}
