//! Status snapshot for periodic reporting

use core::fmt;

use super::mode::Mode;
use crate::motor::MotorCommand;
use crate::sensors::{ColorClass, RangeSample};

/// Point-in-time view of the robot, emitted by the status reporter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    pub mode: Mode,
    /// Filtered heading (degrees)
    pub heading_deg: f32,
    /// Unfiltered heading of the last sample (degrees)
    pub raw_heading_deg: f32,
    pub color: ColorClass,
    /// Normalized RGB in [0, 1]
    pub rgb: [f32; 3],
    pub range: RangeSample,
    pub pitch_deg: f32,
    pub command: MotorCommand,
    pub cups_delivered: u32,
    pub search_rotations: u8,
    pub climb_phase: u8,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={} hdg={:.1} raw={:.1} color={} rgb=({:.2},{:.2},{:.2}) range={} pitch={:.1} {} cups={} rot={} climb={}",
            self.mode,
            self.heading_deg,
            self.raw_heading_deg,
            self.color,
            self.rgb[0],
            self.rgb[1],
            self.rgb[2],
            self.range,
            self.pitch_deg,
            self.command,
            self.cups_delivered,
            self.search_rotations,
            self.climb_phase,
        )
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::format;

    #[test]
    fn test_status_line() {
        let status = StatusSnapshot {
            mode: Mode::Search,
            heading_deg: 123.44,
            raw_heading_deg: 125.0,
            color: ColorClass::White,
            rgb: [0.9, 0.95, 1.0],
            range: RangeSample::NO_OBJECT,
            pitch_deg: 0.3,
            command: MotorCommand::rotate(140),
            cups_delivered: 2,
            search_rotations: 1,
            climb_phase: 0,
        };

        assert_eq!(
            format!("{}", status),
            "mode=SEARCH hdg=123.4 raw=125.0 color=WHITE rgb=(0.90,0.95,1.00) range=none pitch=0.3 L=140 R=-140 cups=2 rot=1 climb=0"
        );
    }

    #[test]
    fn test_status_shows_range() {
        let status = StatusSnapshot {
            mode: Mode::Approach,
            heading_deg: 0.0,
            raw_heading_deg: 0.0,
            color: ColorClass::Red,
            rgb: [0.0; 3],
            range: RangeSample::from_cm(12.34),
            pitch_deg: 0.0,
            command: MotorCommand::STOP,
            cups_delivered: 0,
            search_rotations: 0,
            climb_phase: 0,
        };
        let line = format!("{}", status);
        assert!(line.contains("mode=APPROACH"));
        assert!(line.contains("range=12.3cm"));
        assert!(line.contains("color=RED"));
    }
}
