//! Robot state owned by the behavior state machine

use libm::fabsf;

use super::mode::Mode;
use crate::heading::heading_error;

/// A completed mode change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub at_ms: u64,
}

/// Mutable state of the behavior state machine.
///
/// Only [`RobotState::transition`] changes the mode, so the previous mode is
/// always recorded and per-mode counters always start from zero.
#[derive(Debug, Clone)]
pub struct RobotState {
    mode: Mode,
    previous_mode: Option<Mode>,
    state_start_ms: u64,
    search_start_ms: u64,
    search_rotations: u8,
    search_angle_deg: f32,
    last_search_heading: Option<f32>,
    wander_start_ms: Option<u64>,
    object_detected: bool,
    just_delivered: bool,
    cups_delivered: u32,
    stall_check_allowed: bool,
    climb_phase: u8,
    resume_mode: Mode,
}

impl RobotState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            mode: Mode::Init,
            previous_mode: None,
            state_start_ms: now_ms,
            search_start_ms: now_ms,
            search_rotations: 0,
            search_angle_deg: 0.0,
            last_search_heading: None,
            wander_start_ms: None,
            object_detected: false,
            just_delivered: false,
            cups_delivered: 0,
            stall_check_allowed: false,
            climb_phase: 0,
            resume_mode: Mode::Search,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Mode before the last transition, `None` until the first one
    pub fn previous_mode(&self) -> Option<Mode> {
        self.previous_mode
    }

    pub fn state_start_ms(&self) -> u64 {
        self.state_start_ms
    }

    pub fn elapsed_in_state(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.state_start_ms)
    }

    pub fn search_start_ms(&self) -> u64 {
        self.search_start_ms
    }

    pub fn search_rotations(&self) -> u8 {
        self.search_rotations
    }

    pub fn object_detected(&self) -> bool {
        self.object_detected
    }

    pub fn cups_delivered(&self) -> u32 {
        self.cups_delivered
    }

    pub fn stall_check_allowed(&self) -> bool {
        self.stall_check_allowed
    }

    pub fn climb_phase(&self) -> u8 {
        self.climb_phase
    }

    /// Mode that CLIMB and STACK hand back to when they finish
    pub fn resume_mode(&self) -> Mode {
        self.resume_mode
    }

    pub fn is_wandering(&self) -> bool {
        self.wander_start_ms.is_some()
    }

    /// True during the first search after a delivery
    pub fn just_delivered(&self) -> bool {
        self.just_delivered
    }

    /// Switch to `to`, recording the previous mode and resetting everything
    /// that belongs to the new mode. Re-entering the current mode is allowed
    /// and restarts it.
    pub fn transition(&mut self, to: Mode, now_ms: u64) -> Transition {
        let from = self.mode;
        self.previous_mode = Some(from);
        self.mode = to;
        self.state_start_ms = now_ms;
        self.stall_check_allowed = to.is_driving();

        if from == Mode::Search && to != Mode::Search {
            self.just_delivered = false;
        }

        match to {
            Mode::Search => {
                self.search_start_ms = now_ms;
                self.search_rotations = 0;
                self.search_angle_deg = 0.0;
                self.last_search_heading = None;
                self.wander_start_ms = None;
                self.object_detected = false;
            }
            Mode::CheckStatic if from == Mode::Search => {
                self.object_detected = true;
            }
            Mode::Climb | Mode::Stack => {
                self.climb_phase = 0;
                self.resume_mode = if from.is_driving() {
                    from
                } else {
                    Mode::Search
                };
            }
            Mode::Deposit => {
                self.cups_delivered = self.cups_delivered.saturating_add(1);
                self.just_delivered = true;
            }
            _ => {}
        }

        Transition { from, to, at_ms: now_ms }
    }

    /// Record the climb phase counter. Ignored outside CLIMB.
    pub fn set_climb_phase(&mut self, phase: u8) {
        if self.mode == Mode::Climb {
            self.climb_phase = phase;
        }
    }

    /// Accumulate search rotation from the latest heading and manage the
    /// wander leg. After `rotations_before_wander` full turns the robot
    /// drives straight for `wander_ms`, then counting starts over.
    pub fn update_search(
        &mut self,
        now_ms: u64,
        heading: f32,
        rotations_before_wander: u8,
        wander_ms: u32,
    ) {
        if let Some(start) = self.wander_start_ms {
            if now_ms.saturating_sub(start) >= u64::from(wander_ms) {
                self.wander_start_ms = None;
                self.search_rotations = 0;
                self.search_angle_deg = 0.0;
                self.last_search_heading = Some(heading);
            }
            return;
        }

        if let Some(last) = self.last_search_heading {
            self.search_angle_deg += fabsf(heading_error(heading, last));
        }
        self.last_search_heading = Some(heading);

        while self.search_angle_deg >= 360.0 {
            self.search_angle_deg -= 360.0;
            self.search_rotations = self.search_rotations.saturating_add(1);
        }

        if self.search_rotations >= rotations_before_wander.max(1) {
            self.wander_start_ms = Some(now_ms);
        }
    }
}
