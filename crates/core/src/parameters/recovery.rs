//! Stall and climb parameters
//!
//! # Parameters
//!
//! - `STL_INT_MS` - Stall observation window
//! - `STL_STR_TOL` - Heading drift that means "stuck" while driving straight
//! - `STL_TURN_MIN` - Heading change below which a rotation is "stuck"
//! - `CLB_SLP_MS` - Pitch sampling period
//! - `CLB_SLP_DEG` - Pitch that counts as "on slope"
//! - `CLB_SLP_DEB` - Consecutive on-slope samples required
//! - `CLB_SUMMIT` - Pitch below which the climb is over
//! - `CLB_REV_MS`, `CLB_ARC_MS`, `CLB_FWD_MS` - Timed phase durations
//! - `CLB_ROT_DEG` - Left rotation before the wide arc
//! - `CLB_ROT_TO` - Rotation phase timeout
//! - `CLB_UP_TO` - Upslope push timeout
//! - `CLB_ARC_IN` - Inner wheel speed in the wide arc
//! - `CLB_PWR_SPD` - Upslope push speed

use super::error::ParameterError;
use super::storage::{FloatParam, IntParam, ParameterStore};
use crate::climb::{ClimbConfig, SlopeConfig};
use crate::motor::MAX_MOTOR_SPEED;
use crate::stall::StallConfig;

const MAX_SPEED: i32 = MAX_MOTOR_SPEED as i32;

const STALL_INTERVAL: IntParam = IntParam::new("STL_INT_MS", 200, 50, 2000);
const STALL_STRAIGHT_TOL: FloatParam = FloatParam::new("STL_STR_TOL", 15.0, 1.0, 90.0);
const STALL_MIN_TURN: FloatParam = FloatParam::new("STL_TURN_MIN", 5.0, 0.0, 90.0);

const SLOPE_INTERVAL: IntParam = IntParam::new("CLB_SLP_MS", 50, 10, 1000);
const SLOPE_THRESHOLD: FloatParam = FloatParam::new("CLB_SLP_DEG", 12.0, 2.0, 45.0);
const SLOPE_DEBOUNCE: IntParam = IntParam::new("CLB_SLP_DEB", 3, 1, 20);
const SUMMIT_THRESHOLD: FloatParam = FloatParam::new("CLB_SUMMIT", 4.0, 0.0, 45.0);
const REVERSE_MS: IntParam = IntParam::new("CLB_REV_MS", 600, 0, 5000);
const ROTATE_DEG: FloatParam = FloatParam::new("CLB_ROT_DEG", 60.0, 0.0, 180.0);
const ROTATE_TIMEOUT: IntParam = IntParam::new("CLB_ROT_TO", 1500, 100, 10_000);
const ARC_MS: IntParam = IntParam::new("CLB_ARC_MS", 1200, 0, 10_000);
const ARC_INNER_SPEED: IntParam = IntParam::new("CLB_ARC_IN", 70, -MAX_SPEED, MAX_SPEED);
const FORWARD_MS: IntParam = IntParam::new("CLB_FWD_MS", 800, 0, 10_000);
const UPSLOPE_TIMEOUT: IntParam = IntParam::new("CLB_UP_TO", 4000, 500, 20_000);
const POWER_SPEED: IntParam = IntParam::new("CLB_PWR_SPD", 300, 0, MAX_SPEED);

/// Stall detector parameters
#[derive(Debug, Clone, PartialEq)]
pub struct StallParams {
    pub interval_ms: u32,
    pub straight_tolerance_deg: f32,
    pub min_turn_deg: f32,
}

impl Default for StallParams {
    fn default() -> Self {
        Self {
            interval_ms: STALL_INTERVAL.default as u32,
            straight_tolerance_deg: STALL_STRAIGHT_TOL.default,
            min_turn_deg: STALL_MIN_TURN.default,
        }
    }
}

impl StallParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        STALL_INTERVAL.register(store)?;
        STALL_STRAIGHT_TOL.register(store)?;
        STALL_MIN_TURN.register(store)
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            interval_ms: STALL_INTERVAL.load(store) as u32,
            straight_tolerance_deg: STALL_STRAIGHT_TOL.load(store),
            min_turn_deg: STALL_MIN_TURN.load(store),
        }
    }

    pub fn to_config(&self) -> StallConfig {
        StallConfig {
            interval_ms: self.interval_ms,
            straight_tolerance_deg: self.straight_tolerance_deg,
            min_turn_deg: self.min_turn_deg,
        }
    }
}

/// Slope detection and climb maneuver parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ClimbParams {
    pub slope_interval_ms: u32,
    pub slope_threshold_deg: f32,
    pub slope_debounce: u8,
    pub summit_threshold_deg: f32,
    pub reverse_ms: u32,
    pub rotate_deg: f32,
    pub rotate_timeout_ms: u32,
    pub arc_ms: u32,
    pub arc_inner_speed: i16,
    pub forward_ms: u32,
    pub upslope_timeout_ms: u32,
    pub power_speed: i16,
}

impl Default for ClimbParams {
    fn default() -> Self {
        Self {
            slope_interval_ms: SLOPE_INTERVAL.default as u32,
            slope_threshold_deg: SLOPE_THRESHOLD.default,
            slope_debounce: SLOPE_DEBOUNCE.default as u8,
            summit_threshold_deg: SUMMIT_THRESHOLD.default,
            reverse_ms: REVERSE_MS.default as u32,
            rotate_deg: ROTATE_DEG.default,
            rotate_timeout_ms: ROTATE_TIMEOUT.default as u32,
            arc_ms: ARC_MS.default as u32,
            arc_inner_speed: ARC_INNER_SPEED.default as i16,
            forward_ms: FORWARD_MS.default as u32,
            upslope_timeout_ms: UPSLOPE_TIMEOUT.default as u32,
            power_speed: POWER_SPEED.default as i16,
        }
    }
}

impl ClimbParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        for param in [SLOPE_THRESHOLD, SUMMIT_THRESHOLD, ROTATE_DEG] {
            param.register(store)?;
        }
        for param in [
            SLOPE_INTERVAL,
            SLOPE_DEBOUNCE,
            REVERSE_MS,
            ROTATE_TIMEOUT,
            ARC_MS,
            ARC_INNER_SPEED,
            FORWARD_MS,
            UPSLOPE_TIMEOUT,
            POWER_SPEED,
        ] {
            param.register(store)?;
        }
        Ok(())
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        let ms = |p: IntParam| p.load(store) as u32;
        Self {
            slope_interval_ms: ms(SLOPE_INTERVAL),
            slope_threshold_deg: SLOPE_THRESHOLD.load(store),
            slope_debounce: SLOPE_DEBOUNCE.load(store) as u8,
            summit_threshold_deg: SUMMIT_THRESHOLD.load(store),
            reverse_ms: ms(REVERSE_MS),
            rotate_deg: ROTATE_DEG.load(store),
            rotate_timeout_ms: ms(ROTATE_TIMEOUT),
            arc_ms: ms(ARC_MS),
            arc_inner_speed: ARC_INNER_SPEED.load(store) as i16,
            forward_ms: ms(FORWARD_MS),
            upslope_timeout_ms: ms(UPSLOPE_TIMEOUT),
            power_speed: POWER_SPEED.load(store) as i16,
        }
    }

    pub fn slope_config(&self) -> SlopeConfig {
        SlopeConfig {
            interval_ms: self.slope_interval_ms,
            threshold_deg: self.slope_threshold_deg,
            debounce: self.slope_debounce,
            summit_threshold_deg: self.summit_threshold_deg,
        }
    }

    /// Maneuver config; `speed` is the regular drive speed for the
    /// non-push phases.
    pub fn climb_config(&self, speed: i16, heading_tolerance_deg: f32) -> ClimbConfig {
        ClimbConfig {
            reverse_ms: self.reverse_ms,
            rotate_deg: self.rotate_deg,
            rotate_timeout_ms: self.rotate_timeout_ms,
            arc_ms: self.arc_ms,
            arc_inner_speed: self.arc_inner_speed,
            forward_ms: self.forward_ms,
            upslope_timeout_ms: self.upslope_timeout_ms,
            heading_tolerance_deg,
            speed,
            power_speed: self.power_speed,
        }
    }

    /// Summit threshold below slope threshold
    pub fn is_valid(&self) -> bool {
        self.summit_threshold_deg < self.slope_threshold_deg
    }
}
