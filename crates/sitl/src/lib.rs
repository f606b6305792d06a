//! Software-in-the-loop arena simulator.
//!
//! Runs the unmodified firmware control loop against a simulated arena:
//! white field with a black border, colored goal zones, an optional ramp,
//! cups and a moving opponent. Scenarios are JSON files (see
//! `scenarios/`).

pub mod arena;
pub mod error;
pub mod platform;
pub mod runner;
pub mod sim;

pub use arena::{Scenario, ZoneColor};
pub use error::SimulatorError;
pub use platform::{SimClock, SitlPlatform};
pub use runner::{ArenaRunner, RunSummary};
pub use sim::{CupState, Pose, Simulator};
