//! Drive and heading parameters
//!
//! # Parameters
//!
//! - `DRV_ROT_SPD` - In-place rotation speed while searching
//! - `DRV_FWD_SPD` - Approach speed
//! - `DRV_ESC_SPD` - Transport speed while leaving the pickup point
//! - `DRV_MOVE_SPD` - Transport speed toward the goal
//! - `DRV_AVD_SPD` - Rotation speed when backing off a boundary
//! - `DRV_REV_SPD` - Reverse speed (magnitude)
//! - `HDG_DECL` - Magnetic declination added to the compass heading (deg)
//! - `HDG_TARGET` - Heading toward the goal zone (deg)
//! - `HDG_KP` - Heading PI proportional gain
//! - `HDG_TI_INV` - Heading PI inverse integral time (1/ms)
//! - `HDG_I_LIM` - Heading PI integral clamp (speed units)
//! - `HDG_ALIGN_TOL` - Error accepted as "aligned" after a turn (deg)
//! - `HDG_SETTLE_TOL` - Error accepted after the post-turn wait (deg)
//! - `HDG_TURN_TO` - Turn timeout before the PI integral is reset (ms)

use super::error::ParameterError;
use super::storage::{FloatParam, IntParam, ParameterStore};
use crate::control::PiConfig;
use crate::motor::MAX_MOTOR_SPEED;

const MAX_SPEED: i32 = MAX_MOTOR_SPEED as i32;

const ROTATE_SPEED: IntParam = IntParam::new("DRV_ROT_SPD", 140, 0, MAX_SPEED);
const FORWARD_SPEED: IntParam = IntParam::new("DRV_FWD_SPD", 140, 0, MAX_SPEED);
const ESCAPE_SPEED: IntParam = IntParam::new("DRV_ESC_SPD", 140, 0, MAX_SPEED);
const MOVE_SPEED: IntParam = IntParam::new("DRV_MOVE_SPD", 140, 0, MAX_SPEED);
const AVOID_SPEED: IntParam = IntParam::new("DRV_AVD_SPD", 140, 0, MAX_SPEED);
const REVERSE_SPEED: IntParam = IntParam::new("DRV_REV_SPD", 140, 0, MAX_SPEED);

const DECLINATION: FloatParam = FloatParam::new("HDG_DECL", -7.5, -180.0, 180.0);
const TARGET: FloatParam = FloatParam::new("HDG_TARGET", 0.0, 0.0, 359.9);
const KP: FloatParam = FloatParam::new("HDG_KP", 4.0, 0.0, 20.0);
const TI_INV: FloatParam = FloatParam::new("HDG_TI_INV", 0.004, 0.0, 0.1);
const INTEGRAL_LIMIT: FloatParam = FloatParam::new("HDG_I_LIM", 120.0, 0.0, 400.0);
const ALIGN_TOL: FloatParam = FloatParam::new("HDG_ALIGN_TOL", 3.0, 0.5, 45.0);
const SETTLE_TOL: FloatParam = FloatParam::new("HDG_SETTLE_TOL", 6.0, 0.5, 45.0);
const TURN_TIMEOUT: IntParam = IntParam::new("HDG_TURN_TO", 4000, 200, 30_000);

/// Motor speed presets (driver units, all non-negative)
#[derive(Debug, Clone, PartialEq)]
pub struct DriveParams {
    pub rotate_speed: i16,
    pub forward_speed: i16,
    pub escape_speed: i16,
    pub move_speed: i16,
    pub avoid_speed: i16,
    /// Magnitude; commands use `-reverse_speed`
    pub reverse_speed: i16,
}

impl Default for DriveParams {
    fn default() -> Self {
        let speed = |p: IntParam| p.default as i16;
        Self {
            rotate_speed: speed(ROTATE_SPEED),
            forward_speed: speed(FORWARD_SPEED),
            escape_speed: speed(ESCAPE_SPEED),
            move_speed: speed(MOVE_SPEED),
            avoid_speed: speed(AVOID_SPEED),
            reverse_speed: speed(REVERSE_SPEED),
        }
    }
}

impl DriveParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        for param in [
            ROTATE_SPEED,
            FORWARD_SPEED,
            ESCAPE_SPEED,
            MOVE_SPEED,
            AVOID_SPEED,
            REVERSE_SPEED,
        ] {
            param.register(store)?;
        }
        Ok(())
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        // Ranges are within i16 by construction
        let speed = |p: IntParam| p.load(store) as i16;
        Self {
            rotate_speed: speed(ROTATE_SPEED),
            forward_speed: speed(FORWARD_SPEED),
            escape_speed: speed(ESCAPE_SPEED),
            move_speed: speed(MOVE_SPEED),
            avoid_speed: speed(AVOID_SPEED),
            reverse_speed: speed(REVERSE_SPEED),
        }
    }

    pub fn is_valid(&self) -> bool {
        [
            self.rotate_speed,
            self.forward_speed,
            self.escape_speed,
            self.move_speed,
            self.avoid_speed,
            self.reverse_speed,
        ]
        .iter()
        .all(|&s| (0..=MAX_MOTOR_SPEED).contains(&s))
    }
}

/// Compass and heading-controller parameters
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingParams {
    pub declination_deg: f32,
    pub target_heading_deg: f32,
    pub kp: f32,
    pub ti_inv: f32,
    pub integral_limit: f32,
    pub align_tolerance_deg: f32,
    pub settle_tolerance_deg: f32,
    pub turn_timeout_ms: u32,
}

impl Default for HeadingParams {
    fn default() -> Self {
        Self {
            declination_deg: DECLINATION.default,
            target_heading_deg: TARGET.default,
            kp: KP.default,
            ti_inv: TI_INV.default,
            integral_limit: INTEGRAL_LIMIT.default,
            align_tolerance_deg: ALIGN_TOL.default,
            settle_tolerance_deg: SETTLE_TOL.default,
            turn_timeout_ms: TURN_TIMEOUT.default as u32,
        }
    }
}

impl HeadingParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        for param in [
            DECLINATION,
            TARGET,
            KP,
            TI_INV,
            INTEGRAL_LIMIT,
            ALIGN_TOL,
            SETTLE_TOL,
        ] {
            param.register(store)?;
        }
        TURN_TIMEOUT.register(store)
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            declination_deg: DECLINATION.load(store),
            target_heading_deg: TARGET.load(store),
            kp: KP.load(store),
            ti_inv: TI_INV.load(store),
            integral_limit: INTEGRAL_LIMIT.load(store),
            align_tolerance_deg: ALIGN_TOL.load(store),
            settle_tolerance_deg: SETTLE_TOL.load(store),
            turn_timeout_ms: TURN_TIMEOUT.load(store) as u32,
        }
    }

    pub fn to_pi_config(&self) -> PiConfig {
        PiConfig {
            kp: self.kp,
            ti_inv: self.ti_inv,
            integral_limit: self.integral_limit,
            output_limit: MAX_MOTOR_SPEED as f32,
        }
    }

    pub fn is_valid(&self) -> bool {
        DECLINATION.accepts(self.declination_deg)
            && TARGET.accepts(self.target_heading_deg)
            && KP.accepts(self.kp)
            && TI_INV.accepts(self.ti_inv)
            && INTEGRAL_LIMIT.accepts(self.integral_limit)
            && ALIGN_TOL.accepts(self.align_tolerance_deg)
            && SETTLE_TOL.accepts(self.settle_tolerance_deg)
            && self.settle_tolerance_deg >= self.align_tolerance_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParamValue;

    #[test]
    fn test_drive_defaults_match_speed_presets() {
        let params = DriveParams::default();
        assert_eq!(params.rotate_speed, 140);
        assert_eq!(params.reverse_speed, 140);
        assert!(params.is_valid());
    }

    #[test]
    fn test_drive_from_store_clamps() {
        let mut store = ParameterStore::new();
        DriveParams::register_defaults(&mut store).unwrap();
        store.set("DRV_FWD_SPD", ParamValue::Int(1000)).unwrap();
        store.set("DRV_REV_SPD", ParamValue::Int(-50)).unwrap();

        let params = DriveParams::from_store(&store);
        assert_eq!(params.forward_speed, 400);
        assert_eq!(params.reverse_speed, 0);
        assert_eq!(params.move_speed, 140);
    }

    #[test]
    fn test_heading_defaults_produce_pi_config() {
        let params = HeadingParams::default();
        assert!(params.is_valid());

        let config = params.to_pi_config();
        assert!((config.kp - 4.0).abs() < 1e-6);
        assert!((config.ti_inv - 0.004).abs() < 1e-6);
        assert!((config.output_limit - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_heading_from_store_reads_custom_values() {
        let mut store = ParameterStore::new();
        HeadingParams::register_defaults(&mut store).unwrap();
        store.set("HDG_TARGET", ParamValue::Float(270.0)).unwrap();
        store.set("HDG_TURN_TO", ParamValue::Int(10)).unwrap();

        let params = HeadingParams::from_store(&store);
        assert!((params.target_heading_deg - 270.0).abs() < 1e-6);
        assert_eq!(params.turn_timeout_ms, 200);
    }

    #[test]
    fn test_settle_tolerance_must_cover_alignment() {
        let params = HeadingParams {
            align_tolerance_deg: 10.0,
            settle_tolerance_deg: 5.0,
            ..HeadingParams::default()
        };
        assert!(!params.is_valid());
    }
}
