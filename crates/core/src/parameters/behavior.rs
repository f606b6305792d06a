//! Behavior timing parameters
//!
//! # Parameters
//!
//! - `BHV_SRCH_ROT` - Full search rotations before wandering
//! - `BHV_WANDER_MS` - Straight wander between search rotation bouts
//! - `BHV_APPR_TO` - Approach timeout
//! - `BHV_LOST_MS` - Time the object may be out of range during approach
//! - `BHV_WAIT_MS` - Motors-off settle time after a turn
//! - `BHV_ESC_MS` - Zone checks suppressed after pickup
//! - `BHV_MOVE_TO` - Transport timeout
//! - `BHV_ZONE_TO` - Goal zone confirmation timeout
//! - `BHV_DEP_MS` - Reverse time to release the cup
//! - `BHV_DEP_CONE` - Half-angle around the goal heading ignored by the
//!   first search after a delivery (deg)
//! - `BHV_AVD_REV`, `BHV_AVD_ROT` - Boundary avoidance reverse and rotate times
//! - `BHV_STK_REV`, `BHV_STK_ROT` - Stall recovery reverse and rotate times
//! - `BHV_REDET_MS` - Search ignores the range sensor this long after an
//!   object was judged moving
//! - `BHV_STAT_MS` - Status report period

use super::error::ParameterError;
use super::storage::{IntParam, ParameterStore};

const SEARCH_ROTATIONS: IntParam = IntParam::new("BHV_SRCH_ROT", 2, 1, 20);
const WANDER_MS: IntParam = IntParam::new("BHV_WANDER_MS", 1500, 0, 10_000);
const APPROACH_TIMEOUT: IntParam = IntParam::new("BHV_APPR_TO", 6000, 500, 60_000);
const APPROACH_LOST: IntParam = IntParam::new("BHV_LOST_MS", 500, 0, 5000);
const WAIT_AFTER_TURN: IntParam = IntParam::new("BHV_WAIT_MS", 300, 0, 5000);
const ESCAPE_MS: IntParam = IntParam::new("BHV_ESC_MS", 1000, 0, 10_000);
const MOVE_TIMEOUT: IntParam = IntParam::new("BHV_MOVE_TO", 15_000, 1000, 120_000);
const ZONE_TIMEOUT: IntParam = IntParam::new("BHV_ZONE_TO", 1000, 100, 10_000);
const DEPOSIT_MS: IntParam = IntParam::new("BHV_DEP_MS", 700, 0, 5000);
const DEPOSIT_CONE: IntParam = IntParam::new("BHV_DEP_CONE", 45, 0, 180);
const AVOID_REVERSE_MS: IntParam = IntParam::new("BHV_AVD_REV", 400, 0, 5000);
const AVOID_ROTATE_MS: IntParam = IntParam::new("BHV_AVD_ROT", 500, 0, 5000);
const STACK_REVERSE_MS: IntParam = IntParam::new("BHV_STK_REV", 400, 0, 5000);
const STACK_ROTATE_MS: IntParam = IntParam::new("BHV_STK_ROT", 400, 0, 5000);
const REDETECT_HOLDOFF: IntParam = IntParam::new("BHV_REDET_MS", 300, 0, 5000);
const STATUS_INTERVAL: IntParam = IntParam::new("BHV_STAT_MS", 1000, 100, 60_000);

const ALL: [IntParam; 16] = [
    SEARCH_ROTATIONS,
    WANDER_MS,
    APPROACH_TIMEOUT,
    APPROACH_LOST,
    WAIT_AFTER_TURN,
    ESCAPE_MS,
    MOVE_TIMEOUT,
    ZONE_TIMEOUT,
    DEPOSIT_MS,
    DEPOSIT_CONE,
    AVOID_REVERSE_MS,
    AVOID_ROTATE_MS,
    STACK_REVERSE_MS,
    STACK_ROTATE_MS,
    REDETECT_HOLDOFF,
    STATUS_INTERVAL,
];

/// State machine timing
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorParams {
    pub search_rotations: u8,
    pub search_wander_ms: u32,
    pub approach_timeout_ms: u32,
    pub approach_lost_ms: u32,
    pub wait_after_turn_ms: u32,
    pub escape_ms: u32,
    pub move_timeout_ms: u32,
    pub zone_timeout_ms: u32,
    pub deposit_reverse_ms: u32,
    pub deposit_cone_deg: f32,
    pub avoid_reverse_ms: u32,
    pub avoid_rotate_ms: u32,
    pub stack_reverse_ms: u32,
    pub stack_rotate_ms: u32,
    pub redetect_holdoff_ms: u32,
    pub status_interval_ms: u32,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self::load_with(|p| p.default)
    }
}

impl BehaviorParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        for param in ALL {
            param.register(store)?;
        }
        Ok(())
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        Self::load_with(|p| p.load(store))
    }

    fn load_with(value: impl Fn(IntParam) -> i32) -> Self {
        // Every range is non-negative
        let ms = |p: IntParam| value(p) as u32;
        Self {
            search_rotations: value(SEARCH_ROTATIONS) as u8,
            search_wander_ms: ms(WANDER_MS),
            approach_timeout_ms: ms(APPROACH_TIMEOUT),
            approach_lost_ms: ms(APPROACH_LOST),
            wait_after_turn_ms: ms(WAIT_AFTER_TURN),
            escape_ms: ms(ESCAPE_MS),
            move_timeout_ms: ms(MOVE_TIMEOUT),
            zone_timeout_ms: ms(ZONE_TIMEOUT),
            deposit_reverse_ms: ms(DEPOSIT_MS),
            deposit_cone_deg: value(DEPOSIT_CONE) as f32,
            avoid_reverse_ms: ms(AVOID_REVERSE_MS),
            avoid_rotate_ms: ms(AVOID_ROTATE_MS),
            stack_reverse_ms: ms(STACK_REVERSE_MS),
            stack_rotate_ms: ms(STACK_ROTATE_MS),
            redetect_holdoff_ms: ms(REDETECT_HOLDOFF),
            status_interval_ms: ms(STATUS_INTERVAL),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.search_rotations > 0 && self.escape_ms < self.move_timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParamValue;

    #[test]
    fn test_defaults() {
        let params = BehaviorParams::default();
        assert_eq!(params.search_rotations, 2);
        assert_eq!(params.status_interval_ms, 1000);
        assert!(params.is_valid());
    }

    #[test]
    fn test_register_defaults_populates_all() {
        let mut store = ParameterStore::new();
        BehaviorParams::register_defaults(&mut store).unwrap();
        assert_eq!(store.len(), ALL.len());
        assert_eq!(BehaviorParams::from_store(&store), BehaviorParams::default());
    }

    #[test]
    fn test_from_store_clamps() {
        let mut store = ParameterStore::new();
        BehaviorParams::register_defaults(&mut store).unwrap();
        store.set("BHV_SRCH_ROT", ParamValue::Int(0)).unwrap();
        store.set("BHV_WAIT_MS", ParamValue::Int(250)).unwrap();

        let params = BehaviorParams::from_store(&store);
        assert_eq!(params.search_rotations, 1);
        assert_eq!(params.wait_after_turn_ms, 250);
    }
}
