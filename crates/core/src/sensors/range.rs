//! Ultrasonic ranging and the static-object check
//!
//! A cup stands still, an opponent robot does not. Before approaching a
//! candidate the robot stops and samples the range a few times; the candidate
//! is static only if every sample stays within tolerance of the first.

use core::fmt;

use libm::fabsf;

/// Speed of sound, centimeters per microsecond
const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// One range measurement.
///
/// "Nothing in range" is an ordinary sample ([`RangeSample::NO_OBJECT`]), not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSample {
    distance_cm: f32,
}

impl RangeSample {
    /// Sentinel for a timed-out echo or a reflection beyond max range
    pub const NO_OBJECT: RangeSample = RangeSample {
        distance_cm: f32::INFINITY,
    };

    pub fn from_cm(distance_cm: f32) -> Self {
        if distance_cm.is_finite() && distance_cm >= 0.0 {
            Self { distance_cm }
        } else {
            Self::NO_OBJECT
        }
    }

    /// Convert an echo round-trip time. A missing or zero echo, or a
    /// distance past `max_range_cm`, yields [`RangeSample::NO_OBJECT`].
    pub fn from_echo(echo_us: Option<u32>, max_range_cm: f32) -> Self {
        match echo_us {
            Some(us) if us > 0 => {
                let cm = echo_to_cm(us);
                if cm <= max_range_cm {
                    Self::from_cm(cm)
                } else {
                    Self::NO_OBJECT
                }
            }
            _ => Self::NO_OBJECT,
        }
    }

    pub fn is_object(&self) -> bool {
        self.distance_cm.is_finite()
    }

    /// Distance in centimeters, `None` for no object.
    pub fn distance_cm(&self) -> Option<f32> {
        self.is_object().then_some(self.distance_cm)
    }

    /// True if an object is at most `range_cm` away.
    pub fn within(&self, range_cm: f32) -> bool {
        self.is_object() && self.distance_cm <= range_cm
    }
}

impl Default for RangeSample {
    fn default() -> Self {
        Self::NO_OBJECT
    }
}

impl fmt::Display for RangeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.distance_cm() {
            Some(cm) => write!(f, "{:.1}cm", cm),
            None => f.write_str("none"),
        }
    }
}

/// Round-trip echo time to one-way distance.
pub fn echo_to_cm(echo_us: u32) -> f32 {
    echo_us as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0
}

/// Static-object check configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCheckConfig {
    /// Time between samples (ms)
    pub interval_ms: u32,
    /// Number of samples taken
    pub samples: u8,
    /// Maximum deviation from the first sample (cm)
    pub tolerance_cm: f32,
}

impl Default for StaticCheckConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            samples: 5,
            tolerance_cm: 3.0,
        }
    }
}

/// Result of a static-object check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticVerdict {
    /// Not enough samples yet
    Pending,
    Static,
    Moving,
}

/// Cadence-gated static-object check.
///
/// Takes one sample per `interval_ms`. Decides `Moving` as soon as a sample
/// loses the object or drifts out of tolerance, and `Static` after `samples`
/// consistent samples, so it never runs longer than
/// `samples * interval_ms`.
#[derive(Debug, Clone)]
pub struct StaticCheck {
    config: StaticCheckConfig,
    first_cm: Option<f32>,
    taken: u8,
    last_sample_ms: Option<u64>,
    verdict: StaticVerdict,
}

impl StaticCheck {
    pub fn new(config: StaticCheckConfig) -> Self {
        Self {
            config,
            first_cm: None,
            taken: 0,
            last_sample_ms: None,
            verdict: StaticVerdict::Pending,
        }
    }

    /// Discard collected samples and start a new check.
    pub fn restart(&mut self) {
        self.first_cm = None;
        self.taken = 0;
        self.last_sample_ms = None;
        self.verdict = StaticVerdict::Pending;
    }

    pub fn verdict(&self) -> StaticVerdict {
        self.verdict
    }

    pub fn samples_taken(&self) -> u8 {
        self.taken
    }

    /// Offer the latest range sample. Ignored until `interval_ms` has passed
    /// since the previous accepted sample, and once a verdict is reached.
    pub fn update(&mut self, now_ms: u64, sample: RangeSample) -> StaticVerdict {
        if self.verdict != StaticVerdict::Pending {
            return self.verdict;
        }
        if let Some(last) = self.last_sample_ms {
            if now_ms.saturating_sub(last) < u64::from(self.config.interval_ms) {
                return self.verdict;
            }
        }
        self.last_sample_ms = Some(now_ms);
        self.taken = self.taken.saturating_add(1);

        let Some(distance) = sample.distance_cm() else {
            self.verdict = StaticVerdict::Moving;
            return self.verdict;
        };

        match self.first_cm {
            None => self.first_cm = Some(distance),
            Some(first) if fabsf(distance - first) > self.config.tolerance_cm => {
                self.verdict = StaticVerdict::Moving;
                return self.verdict;
            }
            Some(_) => {}
        }

        if self.taken >= self.config.samples.max(1) {
            self.verdict = StaticVerdict::Static;
        }
        self.verdict
    }
}
