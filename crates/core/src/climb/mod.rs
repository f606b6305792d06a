//! Ramp handling: slope detection and the climb maneuver

pub mod maneuver;
pub mod slope;

pub use maneuver::{ClimbConfig, ClimbController, ClimbPhase};
pub use slope::{SlopeConfig, SlopeDetector, SlopeEvent};
