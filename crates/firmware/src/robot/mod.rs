//! Robot runtime: control loop, calibration routines and status reporting

pub mod button;
pub mod calibration;
pub mod control_loop;
pub mod status;

pub use button::ButtonEdge;
pub use calibration::{CalibrationConfig, CalibrationReport, Calibrator};
pub use control_loop::ControlLoop;
pub use status::StatusReporter;
