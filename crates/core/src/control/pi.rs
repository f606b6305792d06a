//! Heading PI controller
//!
//! Converts a heading error into a steering differential in motor speed
//! units. Positive output means "turn clockwise" (heading increasing), which
//! maps to the wheel pair as `(left, right) = (+u, -u)`.
//!
//! ```text
//! e   = shortest_error(target, current)          (-180, 180]
//! Σe += e * dt_ms
//! u   = kp * e + kp * ti_inv * Σe                 saturated at ±output_limit
//! ```
//!
//! The integral contribution `kp * ti_inv * Σe` is clamped to
//! `±integral_limit`.

use crate::heading::heading_error;

/// PI controller configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiConfig {
    /// Proportional gain (speed units per degree)
    pub kp: f32,
    /// Inverse integral time (1/ms)
    pub ti_inv: f32,
    /// Maximum magnitude of the integral contribution (speed units)
    pub integral_limit: f32,
    /// Output saturation (speed units)
    pub output_limit: f32,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            kp: 4.0,
            ti_inv: 4.0 / 1000.0,
            integral_limit: 120.0,
            output_limit: 400.0,
        }
    }
}

/// Proportional-integral heading controller
#[derive(Debug, Clone)]
pub struct PiController {
    config: PiConfig,
    /// Accumulated error (degree-milliseconds)
    sum_e: f32,
    last_error: f32,
}

impl PiController {
    pub fn new(config: PiConfig) -> Self {
        Self {
            config,
            sum_e: 0.0,
            last_error: 0.0,
        }
    }

    pub fn config(&self) -> &PiConfig {
        &self.config
    }

    /// Compute the steering differential for one cycle.
    ///
    /// `dt_ms` is the time since the previous call; a zero `dt_ms` yields a
    /// pure proportional response without touching the integral.
    pub fn update(&mut self, target: f32, current: f32, dt_ms: u32) -> f32 {
        let error = heading_error(target, current);
        self.last_error = error;

        self.sum_e += error * dt_ms as f32;
        self.clamp_integral();

        let p = self.config.kp * error;
        let i = self.config.kp * self.config.ti_inv * self.sum_e;
        let u = p + i;

        if u.is_finite() {
            u.clamp(-self.config.output_limit, self.config.output_limit)
        } else {
            0.0
        }
    }

    /// Zero the integral. Called on entry to every state that starts a turn.
    pub fn reset(&mut self) {
        self.sum_e = 0.0;
        self.last_error = 0.0;
    }

    /// Accumulated error (degree-milliseconds)
    pub fn integral(&self) -> f32 {
        self.sum_e
    }

    /// Heading error seen on the last update (degrees)
    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    fn clamp_integral(&mut self) {
        let gain = self.config.kp * self.config.ti_inv;
        if gain > 0.0 {
            let max_sum = self.config.integral_limit / gain;
            self.sum_e = self.sum_e.clamp(-max_sum, max_sum);
        } else {
            self.sum_e = 0.0;
        }
    }
}

impl Default for PiController {
    fn default() -> Self {
        Self::new(PiConfig::default())
    }
}
