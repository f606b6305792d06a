//! Runtime parameters
//!
//! Every tunable lives in a RAM [`ParameterStore`] under a short
//! `GROUP_NAME` key. Groups register their defaults at boot and are read
//! back, clamped to range, with `from_store`. [`RobotParams`] aggregates
//! all groups.

pub mod behavior;
pub mod drive;
pub mod error;
pub mod recovery;
pub mod sensing;
pub mod storage;

pub use behavior::BehaviorParams;
pub use drive::{DriveParams, HeadingParams};
pub use error::ParameterError;
pub use recovery::{ClimbParams, StallParams};
pub use sensing::{ColorParams, RangeParams};
pub use storage::{
    FloatParam, IntParam, ParamFlags, ParamName, ParamValue, ParameterStore, MAX_PARAMS,
    PARAM_NAME_LEN,
};

use crate::heading::HEADING_FILTER_SIZE;

/// Heading filter length (compile time, reported read-only)
pub const PARAM_FILTER_SIZE: &str = "SYS_FILT_SIZE";

/// All robot parameter groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotParams {
    pub drive: DriveParams,
    pub heading: HeadingParams,
    pub color: ColorParams,
    pub range: RangeParams,
    pub stall: StallParams,
    pub climb: ClimbParams,
    pub behavior: BehaviorParams,
}

impl RobotParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        DriveParams::register_defaults(store)?;
        HeadingParams::register_defaults(store)?;
        ColorParams::register_defaults(store)?;
        RangeParams::register_defaults(store)?;
        StallParams::register_defaults(store)?;
        ClimbParams::register_defaults(store)?;
        BehaviorParams::register_defaults(store)?;
        store.register(
            PARAM_FILTER_SIZE,
            ParamValue::Int(HEADING_FILTER_SIZE as i32),
            ParamFlags::READ_ONLY,
        )
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            drive: DriveParams::from_store(store),
            heading: HeadingParams::from_store(store),
            color: ColorParams::from_store(store),
            range: RangeParams::from_store(store),
            stall: StallParams::from_store(store),
            climb: ClimbParams::from_store(store),
            behavior: BehaviorParams::from_store(store),
        }
    }

    /// Cross-field consistency of every group
    pub fn is_valid(&self) -> bool {
        self.drive.is_valid()
            && self.heading.is_valid()
            && self.color.is_valid()
            && self.range.is_valid()
            && self.climb.is_valid()
            && self.behavior.is_valid()
    }
}
