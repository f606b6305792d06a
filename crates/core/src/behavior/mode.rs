//! Behavior modes

use core::fmt;

/// Top-level behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for the start button
    Init,
    /// Initial orientation toward the goal heading
    Direction,
    /// Rotating in place looking for a cup
    Search,
    /// Stationary check that the candidate is not a robot
    CheckStatic,
    /// Driving at the candidate
    Approach,
    /// Turning in place toward the goal heading with the cup captured
    TurnToTarget,
    /// Motors off while the compass settles after a turn
    WaitAfterTurn,
    /// Leaving the pickup point, zone checks suppressed
    Escape,
    /// Transporting the cup toward the goal zone
    Move,
    /// Backing away from a boundary line
    Avoid,
    /// Ramp climb maneuver
    Climb,
    /// Stopped on a goal color, confirming the zone
    CheckZone,
    /// Releasing the cup
    Deposit,
    /// Stall recovery
    Stack,
    /// Operator stop, absorbing
    Stop,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Init => "INIT",
            Mode::Direction => "DIRECTION",
            Mode::Search => "SEARCH",
            Mode::CheckStatic => "CHECK_STATIC",
            Mode::Approach => "APPROACH",
            Mode::TurnToTarget => "TURN_TO_TARGET",
            Mode::WaitAfterTurn => "WAIT_AFTER_TURN",
            Mode::Escape => "ESCAPE",
            Mode::Move => "MOVE",
            Mode::Avoid => "AVOID",
            Mode::Climb => "CLIMB",
            Mode::CheckZone => "CHECK_ZONE",
            Mode::Deposit => "DEPOSIT",
            Mode::Stack => "STACK",
            Mode::Stop => "STOP",
        }
    }

    /// Modes that drive around the arena and therefore run the boundary,
    /// stall and slope checks.
    pub fn is_driving(&self) -> bool {
        matches!(self, Mode::Search | Mode::Approach | Mode::Escape | Mode::Move)
    }

    /// Modes steered by the heading controller; each entry zeroes its integral.
    pub fn uses_heading_control(&self) -> bool {
        matches!(
            self,
            Mode::Direction | Mode::TurnToTarget | Mode::Escape | Mode::Move
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driving_modes() {
        let driving = [Mode::Search, Mode::Approach, Mode::Escape, Mode::Move];
        for mode in driving {
            assert!(mode.is_driving(), "{} should be driving", mode.name());
        }
        for mode in [Mode::Init, Mode::Stack, Mode::Climb, Mode::Avoid, Mode::Stop] {
            assert!(!mode.is_driving());
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(Mode::CheckStatic.name(), "CHECK_STATIC");
        assert_eq!(Mode::WaitAfterTurn.name(), "WAIT_AFTER_TURN");
    }
}
