//! Motor command type
//!
//! The behavior layer emits exactly one `MotorCommand` per cycle. Speeds are
//! signed integers in the Zumo driver range `[-MAX_MOTOR_SPEED, MAX_MOTOR_SPEED]`:
//!
//! - `+400` = full forward
//! - `0` = stopped
//! - `-400` = full reverse

use core::fmt;

/// Platform speed limit (Zumo motor driver units)
pub const MAX_MOTOR_SPEED: i16 = 400;

/// Signed left/right wheel speed pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotorCommand {
    pub left: i16,
    pub right: i16,
}

impl MotorCommand {
    /// Both motors at zero
    pub const STOP: MotorCommand = MotorCommand { left: 0, right: 0 };

    /// Build a command, saturating both wheels at the platform limit.
    pub fn new(left: i32, right: i32) -> Self {
        let limit = MAX_MOTOR_SPEED as i32;
        Self {
            left: left.clamp(-limit, limit) as i16,
            right: right.clamp(-limit, limit) as i16,
        }
    }

    /// Straight line at `speed` (negative reverses)
    pub fn straight(speed: i16) -> Self {
        Self::new(speed as i32, speed as i32)
    }

    /// Spin in place; positive `speed` turns clockwise
    pub fn rotate(speed: i16) -> Self {
        Self::new(speed as i32, -(speed as i32))
    }

    /// Forward `base` speed with a clockwise-positive steering differential.
    ///
    /// Non-finite steering is treated as zero.
    pub fn steer(base: i16, steering: f32) -> Self {
        let steering = if steering.is_finite() {
            steering.clamp(-(MAX_MOTOR_SPEED as f32), MAX_MOTOR_SPEED as f32) as i32
        } else {
            0
        };
        Self::new(base as i32 + steering, base as i32 - steering)
    }

    /// Turn in place by a controller output (clockwise positive)
    pub fn turn(steering: f32) -> Self {
        Self::steer(0, steering)
    }

    pub fn is_stopped(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L={} R={}", self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_saturates() {
        let cmd = MotorCommand::new(900, -900);
        assert_eq!(cmd, MotorCommand { left: 400, right: -400 });
    }

    #[test]
    fn test_rotate_is_clockwise_positive() {
        let cmd = MotorCommand::rotate(140);
        assert_eq!(cmd.left, 140);
        assert_eq!(cmd.right, -140);
    }

    #[test]
    fn test_steer_adds_differential() {
        let cmd = MotorCommand::steer(140, 30.7);
        assert_eq!(cmd, MotorCommand { left: 170, right: 110 });

        let cmd = MotorCommand::steer(140, f32::NAN);
        assert_eq!(cmd, MotorCommand::straight(140));
    }

    #[test]
    fn test_steer_clamps_each_wheel() {
        let cmd = MotorCommand::steer(300, 350.0);
        assert_eq!(cmd.left, 400);
        assert_eq!(cmd.right, -50);
    }

    #[test]
    fn test_stop() {
        assert!(MotorCommand::STOP.is_stopped());
        assert!(!MotorCommand::straight(-140).is_stopped());
    }
}
