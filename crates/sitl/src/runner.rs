//! Closed-loop arena runs.
//!
//! `ArenaRunner` owns a simulator and a firmware `ControlLoop` wired to it
//! through [`SitlPlatform`]. Each step runs one control cycle against the
//! current world, then advances physics by the control period.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use zumo_cup_core::behavior::{Behavior, Mode, StatusSnapshot, Transition};
use zumo_cup_core::heading::CompassCalibration;
use zumo_cup_core::traits::TimeSource;
use zumo_cup_firmware::robot::{CalibrationConfig, ControlLoop};

use crate::arena::Scenario;
use crate::error::SimulatorError;
use crate::platform::{lock, SharedSim, SimClock, SitlPlatform};
use crate::sim::{Pose, Simulator};

/// Control period matching the firmware ticker
pub const CONTROL_PERIOD_MS: u64 = 20;

/// Button reads needed for one press edge (released, then pressed)
const PRESS_TICKS: usize = 2;

pub struct ArenaRunner {
    sim: SharedSim,
    clock: SimClock,
    control: ControlLoop<SitlPlatform, SimClock>,
    transitions: Vec<Transition>,
}

impl ArenaRunner {
    pub fn new(scenario: Scenario) -> Self {
        let clock = SimClock::new();
        let params = scenario.robot_params();
        let sim = Arc::new(Mutex::new(Simulator::new(scenario, clock.clone())));
        let control = ControlLoop::new(
            SitlPlatform::new(sim.clone()),
            clock.clone(),
            Behavior::new(params),
        );
        Self {
            sim,
            clock,
            control,
            transitions: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn behavior(&self) -> &Behavior {
        self.control.behavior()
    }

    pub fn mode(&self) -> Mode {
        self.control.behavior().mode()
    }

    pub fn pose(&self) -> Pose {
        lock(&self.sim).pose()
    }

    pub fn cups_delivered(&self) -> usize {
        lock(&self.sim).cups_delivered()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// True if the run has ever entered `mode`
    pub fn visited(&self, mode: Mode) -> bool {
        self.transitions.iter().any(|t| t.to == mode)
    }

    /// Run `f` with exclusive access to the simulator.
    pub fn with_sim<R>(&self, f: impl FnOnce(&mut Simulator) -> R) -> R {
        f(&mut lock(&self.sim))
    }

    pub fn press_button(&mut self) {
        lock(&self.sim).queue_press();
    }

    /// One control cycle followed by one physics step.
    pub fn step(&mut self) -> Option<Transition> {
        let output = self.control.tick();
        if let Some(transition) = output.transition {
            self.transitions.push(transition);
        }
        lock(&self.sim).step(CONTROL_PERIOD_MS);
        output.transition
    }

    /// Press the start button and run until the robot leaves `Init`.
    pub fn start(&mut self) -> Result<(), SimulatorError> {
        self.press_button();
        for _ in 0..=PRESS_TICKS {
            self.step();
            if self.mode() != Mode::Init {
                return Ok(());
            }
        }
        Err(SimulatorError::InvalidScenario(
            "robot did not leave INIT after the start press".to_string(),
        ))
    }

    pub fn run_for(&mut self, duration_ms: u64) {
        let deadline = self.now_ms() + duration_ms;
        while self.now_ms() < deadline {
            self.step();
        }
    }

    /// Step until `done` holds or `timeout_ms` elapses; returns whether
    /// `done` was reached.
    pub fn run_until(&mut self, timeout_ms: u64, mut done: impl FnMut(&Self) -> bool) -> bool {
        let deadline = self.now_ms() + timeout_ms;
        while self.now_ms() < deadline {
            self.step();
            if done(self) {
                return true;
            }
        }
        false
    }

    /// Rotate-in-place compass calibration against the simulated field.
    pub fn calibrate_compass(
        &mut self,
        config: CalibrationConfig,
    ) -> Result<CompassCalibration, SimulatorError> {
        self.press_button();
        Ok(self.control.calibrate_compass(config)?)
    }

    pub fn summary(&self) -> RunSummary {
        let sim = lock(&self.sim);
        let pose = sim.pose();
        RunSummary {
            scenario: sim.scenario().name.clone(),
            elapsed_ms: self.now_ms(),
            final_mode: self.mode().name(),
            cups_delivered: sim.cups_delivered(),
            cups_total: sim.cups().len(),
            black_entries: sim.black_entries(),
            final_pose: PoseRecord {
                x: pose.x,
                y: pose.y,
                heading_deg: pose.heading_deg,
            },
            transitions: self
                .transitions
                .iter()
                .map(|t| TransitionRecord {
                    at_ms: t.at_ms,
                    from: t.from.name(),
                    to: t.to.name(),
                })
                .collect(),
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        self.control.behavior().status()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseRecord {
    pub x: f32,
    pub y: f32,
    pub heading_deg: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub at_ms: u64,
    pub from: &'static str,
    pub to: &'static str,
}

/// Outcome of an arena run, printable or serializable to JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub elapsed_ms: u64,
    pub final_mode: &'static str,
    pub cups_delivered: usize,
    pub cups_total: usize,
    pub black_entries: u32,
    pub final_pose: PoseRecord,
    pub transitions: Vec<TransitionRecord>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario: {}", self.scenario)?;
        writeln!(f, "elapsed:  {:.1} s", self.elapsed_ms as f32 / 1000.0)?;
        writeln!(f, "mode:     {}", self.final_mode)?;
        writeln!(f, "cups:     {}/{}", self.cups_delivered, self.cups_total)?;
        writeln!(f, "border:   {} black crossings", self.black_entries)?;
        writeln!(
            f,
            "pose:     ({:.1}, {:.1}) hdg {:.1}",
            self.final_pose.x, self.final_pose.y, self.final_pose.heading_deg
        )?;
        write!(f, "transitions: {}", self.transitions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_until_started() {
        let mut runner = ArenaRunner::new(Scenario::default());
        runner.run_for(500);
        assert_eq!(runner.mode(), Mode::Init);
        assert_eq!(runner.now_ms(), 500);
        assert!(runner.transitions().is_empty());
    }

    #[test]
    fn test_start_enters_direction() {
        let mut runner = ArenaRunner::new(Scenario::default());
        runner.start().unwrap();
        assert_eq!(runner.transitions()[0].to, Mode::Direction);
        assert!(runner.visited(Mode::Direction));
    }

    #[test]
    fn test_summary_serializes() {
        let mut runner = ArenaRunner::new(Scenario::default());
        runner.start().unwrap();
        let summary = runner.summary();
        assert_eq!(summary.final_mode, runner.mode().name());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["scenario"], "default");
        assert_eq!(json["transitions"][0]["to"], "DIRECTION");
        assert!(summary.to_string().contains("cups:     0/0"));
    }
}
