//! Multi-phase ramp climb
//!
//! Driving straight at the ramp edge tends to stall the tracks, so the robot
//! backs off and comes around in a wide arc before taking the ramp head-on:
//!
//! ```text
//! Reverse ─► RotateLeft ─► WideArc ─► RotateRight ─► DriveForward ─► PowerUpslope ─► Done
//!  (time)   (heading/to)    (time)     (heading/to)      (time)      (summit/timeout)
//! ```

use crate::heading::{heading_error, wrap_360};
use crate::motor::MotorCommand;

/// Climb maneuver configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimbConfig {
    pub reverse_ms: u32,
    /// Counter-clockwise rotation relative to the entry heading (degrees)
    pub rotate_deg: f32,
    /// Time limit for each rotation phase (ms)
    pub rotate_timeout_ms: u32,
    pub arc_ms: u32,
    /// Inner (right) wheel speed during the wide arc
    pub arc_inner_speed: i16,
    pub forward_ms: u32,
    pub upslope_timeout_ms: u32,
    /// Tolerance for "heading reached" (degrees)
    pub heading_tolerance_deg: f32,
    /// Speed for every phase except the final push
    pub speed: i16,
    /// Speed while powering up the slope
    pub power_speed: i16,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            reverse_ms: 600,
            rotate_deg: 60.0,
            rotate_timeout_ms: 1500,
            arc_ms: 1200,
            arc_inner_speed: 70,
            forward_ms: 800,
            upslope_timeout_ms: 4000,
            heading_tolerance_deg: 5.0,
            speed: 140,
            power_speed: 300,
        }
    }
}

/// Climb phase, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClimbPhase {
    Reverse,
    RotateLeft,
    WideArc,
    RotateRight,
    DriveForward,
    PowerUpslope,
    Done,
}

impl ClimbPhase {
    /// Phase counter, 0 for `Reverse`
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClimbPhase::Reverse => "REVERSE",
            ClimbPhase::RotateLeft => "ROTATE_LEFT",
            ClimbPhase::WideArc => "WIDE_ARC",
            ClimbPhase::RotateRight => "ROTATE_RIGHT",
            ClimbPhase::DriveForward => "DRIVE_FORWARD",
            ClimbPhase::PowerUpslope => "POWER_UPSLOPE",
            ClimbPhase::Done => "DONE",
        }
    }

    fn next(self) -> Self {
        match self {
            ClimbPhase::Reverse => ClimbPhase::RotateLeft,
            ClimbPhase::RotateLeft => ClimbPhase::WideArc,
            ClimbPhase::WideArc => ClimbPhase::RotateRight,
            ClimbPhase::RotateRight => ClimbPhase::DriveForward,
            ClimbPhase::DriveForward => ClimbPhase::PowerUpslope,
            ClimbPhase::PowerUpslope | ClimbPhase::Done => ClimbPhase::Done,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClimbController {
    config: ClimbConfig,
    phase: ClimbPhase,
    phase_start_ms: u64,
    entry_heading: f32,
}

impl ClimbController {
    pub fn new(config: ClimbConfig) -> Self {
        Self {
            config,
            phase: ClimbPhase::Done,
            phase_start_ms: 0,
            entry_heading: 0.0,
        }
    }

    /// Begin a new maneuver from `Reverse`, remembering the entry heading.
    pub fn start(&mut self, now_ms: u64, heading: f32) {
        self.phase = ClimbPhase::Reverse;
        self.phase_start_ms = now_ms;
        self.entry_heading = wrap_360(heading);
    }

    pub fn phase(&self) -> ClimbPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == ClimbPhase::Done
    }

    pub fn entry_heading(&self) -> f32 {
        self.entry_heading
    }

    /// Advance at most one phase and return the command for the phase the
    /// maneuver is in afterwards. `summit` is only honored in
    /// `PowerUpslope`.
    pub fn step(&mut self, now_ms: u64, heading: f32, summit: bool) -> MotorCommand {
        let elapsed = now_ms.saturating_sub(self.phase_start_ms);
        let timed_out = |limit_ms: u32| elapsed >= u64::from(limit_ms);
        let tol = self.config.heading_tolerance_deg;

        let finished = match self.phase {
            ClimbPhase::Reverse => timed_out(self.config.reverse_ms),
            ClimbPhase::RotateLeft => {
                let target = wrap_360(self.entry_heading - self.config.rotate_deg);
                heading_error(target, heading) >= -tol
                    || timed_out(self.config.rotate_timeout_ms)
            }
            ClimbPhase::WideArc => timed_out(self.config.arc_ms),
            ClimbPhase::RotateRight => {
                heading_error(self.entry_heading, heading) <= tol
                    || timed_out(self.config.rotate_timeout_ms)
            }
            ClimbPhase::DriveForward => timed_out(self.config.forward_ms),
            ClimbPhase::PowerUpslope => summit || timed_out(self.config.upslope_timeout_ms),
            ClimbPhase::Done => false,
        };

        if finished {
            self.phase = self.phase.next();
            self.phase_start_ms = now_ms;
        }

        self.command()
    }

    fn command(&self) -> MotorCommand {
        let speed = self.config.speed;
        match self.phase {
            ClimbPhase::Reverse => MotorCommand::straight(-speed),
            ClimbPhase::RotateLeft => MotorCommand::rotate(-speed),
            ClimbPhase::WideArc => {
                MotorCommand::new(i32::from(speed), i32::from(self.config.arc_inner_speed))
            }
            ClimbPhase::RotateRight => MotorCommand::rotate(speed),
            ClimbPhase::DriveForward => MotorCommand::straight(speed),
            ClimbPhase::PowerUpslope => MotorCommand::straight(self.config.power_speed),
            ClimbPhase::Done => MotorCommand::STOP,
        }
    }
}

impl Default for ClimbController {
    fn default() -> Self {
        Self::new(ClimbConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_controller_is_idle() {
        let climb = ClimbController::default();
        assert!(climb.is_done());
    }

    #[test]
    fn test_phase_sequence() {
        let config = ClimbConfig::default();
        let mut climb = ClimbController::new(config);
        climb.start(0, 90.0);
        assert_eq!(climb.phase().index(), 0);

        let cmd = climb.step(100, 90.0, false);
        assert_eq!(cmd, MotorCommand::straight(-config.speed));

        // Reverse elapses
        climb.step(600, 90.0, false);
        assert_eq!(climb.phase(), ClimbPhase::RotateLeft);

        // Not yet rotated far enough
        climb.step(700, 60.0, false);
        assert_eq!(climb.phase(), ClimbPhase::RotateLeft);
        climb.step(800, 31.0, false);
        assert_eq!(climb.phase(), ClimbPhase::WideArc);

        climb.step(2000, 40.0, false);
        assert_eq!(climb.phase(), ClimbPhase::RotateRight);

        climb.step(2100, 70.0, false);
        assert_eq!(climb.phase(), ClimbPhase::RotateRight);
        climb.step(2200, 88.0, false);
        assert_eq!(climb.phase(), ClimbPhase::DriveForward);

        climb.step(3000, 90.0, false);
        assert_eq!(climb.phase(), ClimbPhase::PowerUpslope);
        assert_eq!(
            climb.step(3050, 90.0, false),
            MotorCommand::straight(config.power_speed)
        );

        climb.step(3500, 90.0, true);
        assert!(climb.is_done());
        assert_eq!(climb.step(3550, 90.0, false), MotorCommand::STOP);
    }

    #[test]
    fn test_summit_ignored_before_final_phase() {
        let mut climb = ClimbController::default();
        climb.start(0, 0.0);
        climb.step(10, 0.0, true);
        assert_eq!(climb.phase(), ClimbPhase::Reverse);
    }

    #[test]
    fn test_rotation_times_out() {
        let mut climb = ClimbController::default();
        climb.start(0, 0.0);
        climb.step(600, 0.0, false);
        assert_eq!(climb.phase(), ClimbPhase::RotateLeft);
        climb.step(2100, 0.0, false);
        assert_eq!(climb.phase(), ClimbPhase::WideArc);
    }

    #[test]
    fn test_restart_resets_phase() {
        let mut climb = ClimbController::default();
        climb.start(0, 0.0);
        climb.step(600, 0.0, false);
        climb.start(1000, 180.0);
        assert_eq!(climb.phase(), ClimbPhase::Reverse);
        assert_eq!(climb.entry_heading(), 180.0);
    }
}
