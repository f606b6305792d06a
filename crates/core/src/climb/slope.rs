//! Pitch-based slope detection

/// Slope detector configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeConfig {
    /// Pitch sampling period (ms)
    pub interval_ms: u32,
    /// Pitch at or above which a sample counts as "on slope" (degrees)
    pub threshold_deg: f32,
    /// Consecutive on-slope samples required
    pub debounce: u8,
    /// Pitch below which an on-slope robot has reached the top (degrees)
    pub summit_threshold_deg: f32,
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self {
            interval_ms: 50,
            threshold_deg: 12.0,
            debounce: 3,
            summit_threshold_deg: 4.0,
        }
    }
}

/// Edge reported by [`SlopeDetector::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeEvent {
    None,
    /// Debounced transition onto a slope
    SlopeStart,
    /// Pitch dropped below the summit threshold while on a slope
    Summit,
}

#[derive(Debug, Clone)]
pub struct SlopeDetector {
    config: SlopeConfig,
    last_sample_ms: Option<u64>,
    consecutive: u8,
    on_slope: bool,
    pitch_deg: f32,
}

impl SlopeDetector {
    pub fn new(config: SlopeConfig) -> Self {
        Self {
            config,
            last_sample_ms: None,
            consecutive: 0,
            on_slope: false,
            pitch_deg: 0.0,
        }
    }

    pub fn on_slope(&self) -> bool {
        self.on_slope
    }

    /// Pitch of the last accepted sample (degrees)
    pub fn pitch_deg(&self) -> f32 {
        self.pitch_deg
    }

    pub fn reset(&mut self) {
        self.last_sample_ms = None;
        self.consecutive = 0;
        self.on_slope = false;
    }

    /// Offer a pitch sample. Calls within `interval_ms` of the previous
    /// accepted sample return [`SlopeEvent::None`] without effect.
    pub fn update(&mut self, now_ms: u64, pitch_deg: f32) -> SlopeEvent {
        if let Some(last) = self.last_sample_ms {
            if now_ms.saturating_sub(last) < u64::from(self.config.interval_ms) {
                return SlopeEvent::None;
            }
        }
        self.last_sample_ms = Some(now_ms);
        self.pitch_deg = pitch_deg;

        if self.on_slope {
            if pitch_deg < self.config.summit_threshold_deg {
                self.on_slope = false;
                self.consecutive = 0;
                return SlopeEvent::Summit;
            }
            return SlopeEvent::None;
        }

        if pitch_deg >= self.config.threshold_deg {
            self.consecutive = self.consecutive.saturating_add(1);
            if self.consecutive >= self.config.debounce.max(1) {
                self.on_slope = true;
                return SlopeEvent::SlopeStart;
            }
        } else {
            self.consecutive = 0;
        }
        SlopeEvent::None
    }
}

impl Default for SlopeDetector {
    fn default() -> Self {
        Self::new(SlopeConfig::default())
    }
}
