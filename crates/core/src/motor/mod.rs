//! Motor driver abstraction
//!
//! The behavior layer only ever produces a [`MotorCommand`]; the platform
//! owns the actual driver and implements [`MotorDriver`].
//!
//! # Design
//!
//! The driver is fire-and-forget: it clamps or ignores what it cannot do and
//! never reports back, so motor output can never stall the control loop.

mod command;

pub use command::{MotorCommand, MAX_MOTOR_SPEED};

/// Differential drive motor driver (platform-independent)
pub trait MotorDriver {
    /// Apply a signed left/right speed pair.
    fn set_speeds(&mut self, command: MotorCommand);

    /// Stop both motors.
    #[inline]
    fn stop(&mut self) {
        self.set_speeds(MotorCommand::STOP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock driver that records the last command
    #[derive(Debug, Default)]
    struct MockDriver {
        last: Option<MotorCommand>,
        writes: usize,
    }

    impl MotorDriver for MockDriver {
        fn set_speeds(&mut self, command: MotorCommand) {
            self.last = Some(command);
            self.writes += 1;
        }
    }

    #[test]
    fn test_stop_writes_zero() {
        let mut driver = MockDriver::default();
        driver.set_speeds(MotorCommand::straight(140));
        driver.stop();

        assert_eq!(driver.last, Some(MotorCommand::STOP));
        assert_eq!(driver.writes, 2);
    }
}
