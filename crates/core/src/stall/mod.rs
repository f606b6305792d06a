//! Stall detection
//!
//! Compares what the robot was told to do with what the compass says it did.
//! Every `interval_ms` the heading change over the window is checked against
//! the commanded intent:
//!
//! | Intent     | Stuck when                                   |
//! |------------|----------------------------------------------|
//! | `Straight` | \|Δheading\| > `straight_tolerance_deg`        |
//! | `Rotate`   | \|Δheading\| < `min_turn_deg`                  |
//! | `Hold`     | \|error\| grew by > `straight_tolerance_deg`   |
//!
//! A robot pinned against a cup or wall either slews sideways while "driving
//! straight" or cannot turn while "rotating". Under heading control the
//! robot may turn hard toward its target, so only a swing away from the
//! target counts.

use libm::fabsf;

use crate::heading::heading_error;

/// What the motors are currently being asked to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionIntent {
    Straight,
    Rotate,
    /// Driving while steered toward `target` (degrees)
    Hold { target: f32 },
}

/// Stall detector configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StallConfig {
    /// Observation window (ms)
    pub interval_ms: u32,
    /// Maximum heading drift while driving straight (degrees)
    pub straight_tolerance_deg: f32,
    /// Minimum heading change while rotating (degrees)
    pub min_turn_deg: f32,
}

impl Default for StallConfig {
    fn default() -> Self {
        Self {
            interval_ms: 200,
            straight_tolerance_deg: 15.0,
            min_turn_deg: 5.0,
        }
    }
}

/// Outcome of one detector update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallVerdict {
    /// Gated off or window still open
    Pending,
    /// Last window matched the intent
    Moving,
    Stuck,
}

#[derive(Debug, Clone)]
pub struct StallDetector {
    config: StallConfig,
    intent: Option<MotionIntent>,
    baseline_heading: f32,
    window_start_ms: u64,
}

impl StallDetector {
    pub fn new(config: StallConfig) -> Self {
        Self {
            config,
            intent: None,
            baseline_heading: 0.0,
            window_start_ms: 0,
        }
    }

    pub fn config(&self) -> &StallConfig {
        &self.config
    }

    /// Drop the current window. The next gated-on update starts a new one.
    pub fn reset(&mut self) {
        self.intent = None;
    }

    /// Feed the current heading.
    ///
    /// `intent == None` gates the check off. Turning it back on, or changing
    /// the intent, re-baselines the window at `heading`.
    pub fn update(
        &mut self,
        now_ms: u64,
        heading: f32,
        intent: Option<MotionIntent>,
    ) -> StallVerdict {
        let Some(intent) = intent else {
            self.intent = None;
            return StallVerdict::Pending;
        };

        if self.intent != Some(intent) {
            self.intent = Some(intent);
            self.rebaseline(now_ms, heading);
            return StallVerdict::Pending;
        }

        if now_ms.saturating_sub(self.window_start_ms) < u64::from(self.config.interval_ms) {
            return StallVerdict::Pending;
        }

        let delta = fabsf(heading_error(heading, self.baseline_heading));
        let baseline = self.baseline_heading;
        self.rebaseline(now_ms, heading);

        let stuck = match intent {
            MotionIntent::Straight => delta > self.config.straight_tolerance_deg,
            MotionIntent::Rotate => delta < self.config.min_turn_deg,
            MotionIntent::Hold { target } => {
                let growth = fabsf(heading_error(target, heading))
                    - fabsf(heading_error(target, baseline));
                growth > self.config.straight_tolerance_deg
            }
        };
        if stuck {
            StallVerdict::Stuck
        } else {
            StallVerdict::Moving
        }
    }

    fn rebaseline(&mut self, now_ms: u64, heading: f32) {
        self.baseline_heading = heading;
        self.window_start_ms = now_ms;
    }
}

impl Default for StallDetector {
    fn default() -> Self {
        Self::new(StallConfig::default())
    }
}
