//! Behavior layer: modes, robot state and the control-cycle state machine

mod machine;
mod mode;
mod state;
mod status;

pub use machine::{Behavior, SensorFrame, TickOutput};
pub use mode::Mode;
pub use state::{RobotState, Transition};
pub use status::StatusSnapshot;
