//! Color and range parameters
//!
//! # Parameters
//!
//! - `CLR_BLK_MAX` - All channels at or below this read BLACK
//! - `CLR_WHT_MIN` - All channels at or above this read WHITE
//! - `CLR_DOM_MIN` - Minimum dominant channel for RED/BLUE
//! - `CLR_DOM_MRG` - Margin of the dominant channel over the others
//! - `CLR_GOAL` - Goal zone color (0 = RED, 1 = BLUE)
//! - `CLR_ZONE_CNF` - Consecutive goal readings that confirm the zone
//! - `RNG_MAX_CM` - Reflections beyond this read as "no object"
//! - `RNG_DETECT_CM` - Search detection range
//! - `RNG_CONTACT_CM` - Range at which the object counts as captured
//! - `RNG_STAT_MS` - Static check sample period
//! - `RNG_STAT_N` - Static check sample count
//! - `RNG_STAT_TOL` - Static check tolerance (cm)

use super::error::ParameterError;
use super::storage::{FloatParam, IntParam, ParameterStore};
use crate::sensors::{ColorClass, ColorThresholds, StaticCheckConfig};

const BLACK_MAX: FloatParam = FloatParam::new("CLR_BLK_MAX", 0.2, 0.0, 1.0);
const WHITE_MIN: FloatParam = FloatParam::new("CLR_WHT_MIN", 0.8, 0.0, 1.0);
const DOMINANT_MIN: FloatParam = FloatParam::new("CLR_DOM_MIN", 0.45, 0.0, 1.0);
const DOMINANCE_MARGIN: FloatParam = FloatParam::new("CLR_DOM_MRG", 0.2, 0.0, 1.0);
const GOAL: IntParam = IntParam::new("CLR_GOAL", 0, 0, 1);
const ZONE_CONFIRM: IntParam = IntParam::new("CLR_ZONE_CNF", 3, 1, 20);

const MAX_RANGE: FloatParam = FloatParam::new("RNG_MAX_CM", 200.0, 10.0, 400.0);
const DETECT_RANGE: FloatParam = FloatParam::new("RNG_DETECT_CM", 40.0, 5.0, 400.0);
const CONTACT_RANGE: FloatParam = FloatParam::new("RNG_CONTACT_CM", 6.0, 1.0, 50.0);
const STATIC_INTERVAL: IntParam = IntParam::new("RNG_STAT_MS", 100, 20, 1000);
const STATIC_SAMPLES: IntParam = IntParam::new("RNG_STAT_N", 5, 2, 20);
const STATIC_TOLERANCE: FloatParam = FloatParam::new("RNG_STAT_TOL", 3.0, 0.5, 50.0);

/// Floor color classification parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ColorParams {
    pub black_max: f32,
    pub white_min: f32,
    pub dominant_min: f32,
    pub dominance_margin: f32,
    /// RED or BLUE
    pub goal: ColorClass,
    pub zone_confirm_samples: u8,
}

fn goal_from_index(index: i32) -> ColorClass {
    if index == 1 {
        ColorClass::Blue
    } else {
        ColorClass::Red
    }
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            black_max: BLACK_MAX.default,
            white_min: WHITE_MIN.default,
            dominant_min: DOMINANT_MIN.default,
            dominance_margin: DOMINANCE_MARGIN.default,
            goal: goal_from_index(GOAL.default),
            zone_confirm_samples: ZONE_CONFIRM.default as u8,
        }
    }
}

impl ColorParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        for param in [BLACK_MAX, WHITE_MIN, DOMINANT_MIN, DOMINANCE_MARGIN] {
            param.register(store)?;
        }
        GOAL.register(store)?;
        ZONE_CONFIRM.register(store)
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            black_max: BLACK_MAX.load(store),
            white_min: WHITE_MIN.load(store),
            dominant_min: DOMINANT_MIN.load(store),
            dominance_margin: DOMINANCE_MARGIN.load(store),
            goal: goal_from_index(GOAL.load(store)),
            zone_confirm_samples: ZONE_CONFIRM.load(store) as u8,
        }
    }

    pub fn thresholds(&self) -> ColorThresholds {
        ColorThresholds {
            black_max: self.black_max,
            white_min: self.white_min,
            dominant_min: self.dominant_min,
            dominance_margin: self.dominance_margin,
        }
    }

    /// BLACK and WHITE bands must not overlap and the goal must be a zone color.
    pub fn is_valid(&self) -> bool {
        self.black_max < self.white_min
            && matches!(self.goal, ColorClass::Red | ColorClass::Blue)
            && self.zone_confirm_samples > 0
    }
}

/// Ranging and static-check parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RangeParams {
    pub max_range_cm: f32,
    pub detect_range_cm: f32,
    pub contact_range_cm: f32,
    pub static_interval_ms: u32,
    pub static_samples: u8,
    pub static_tolerance_cm: f32,
}

impl Default for RangeParams {
    fn default() -> Self {
        Self {
            max_range_cm: MAX_RANGE.default,
            detect_range_cm: DETECT_RANGE.default,
            contact_range_cm: CONTACT_RANGE.default,
            static_interval_ms: STATIC_INTERVAL.default as u32,
            static_samples: STATIC_SAMPLES.default as u8,
            static_tolerance_cm: STATIC_TOLERANCE.default,
        }
    }
}

impl RangeParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        for param in [MAX_RANGE, DETECT_RANGE, CONTACT_RANGE, STATIC_TOLERANCE] {
            param.register(store)?;
        }
        STATIC_INTERVAL.register(store)?;
        STATIC_SAMPLES.register(store)
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            max_range_cm: MAX_RANGE.load(store),
            detect_range_cm: DETECT_RANGE.load(store),
            contact_range_cm: CONTACT_RANGE.load(store),
            static_interval_ms: STATIC_INTERVAL.load(store) as u32,
            static_samples: STATIC_SAMPLES.load(store) as u8,
            static_tolerance_cm: STATIC_TOLERANCE.load(store),
        }
    }

    pub fn static_check_config(&self) -> StaticCheckConfig {
        StaticCheckConfig {
            interval_ms: self.static_interval_ms,
            samples: self.static_samples,
            tolerance_cm: self.static_tolerance_cm,
        }
    }

    /// Contact range < detect range <= max range
    pub fn is_valid(&self) -> bool {
        self.contact_range_cm < self.detect_range_cm && self.detect_range_cm <= self.max_range_cm
    }
}
