//! Circular-mean heading filter
//!
//! Smooths compass noise by averaging the last `N` raw headings on the unit
//! circle. An arithmetic mean would turn 359°/1° into 180°; the circular mean
//! gives 0°.

use heapless::HistoryBuffer;

use super::angle::{circular_mean, wrap_360};

/// Default number of raw headings kept by the filter.
pub const HEADING_FILTER_SIZE: usize = 5;

/// Moving circular-mean filter over the last `N` headings.
///
/// Until the buffer fills, only the samples seen so far are averaged, so the
/// first output equals the first input.
pub struct HeadingFilter<const N: usize = HEADING_FILTER_SIZE> {
    history: HistoryBuffer<f32, N>,
    last_output: f32,
}

impl<const N: usize> HeadingFilter<N> {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self {
            history: HistoryBuffer::new(),
            last_output: 0.0,
        }
    }

    /// Push a raw heading (degrees) and return the filtered heading in [0, 360).
    ///
    /// When the buffered headings cancel out, the newest raw heading is
    /// returned instead of an undefined mean.
    pub fn apply(&mut self, heading: f32) -> f32 {
        let heading = wrap_360(heading);
        self.history.write(heading);
        self.last_output = circular_mean(self.history.as_slice()).unwrap_or(heading);
        self.last_output
    }

    /// Last filtered heading (0.0 before the first sample).
    pub fn output(&self) -> f32 {
        self.last_output
    }

    /// Number of samples currently buffered.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True if no sample has been pushed since creation or reset.
    pub fn is_empty(&self) -> bool {
        self.history.len() == 0
    }

    /// Drop all buffered headings.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_output = 0.0;
    }
}

impl<const N: usize> Default for HeadingFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_returns_raw_heading() {
        let mut filter: HeadingFilter = HeadingFilter::new();
        let result = filter.apply(45.0);
        assert!((result - 45.0).abs() < 0.001);
    }

    #[test]
    fn test_constant_heading_converges() {
        let mut filter: HeadingFilter = HeadingFilter::new();
        for h in [10.0, 80.0, 200.0, 300.0, 20.0] {
            filter.apply(h);
        }
        let mut out = 0.0;
        for _ in 0..HEADING_FILTER_SIZE {
            out = filter.apply(123.0);
        }
        assert!((out - 123.0).abs() < 0.01, "expected 123.0, got {}", out);
    }

    #[test]
    fn test_wraparound_average_near_north() {
        let mut filter: HeadingFilter = HeadingFilter::new();
        filter.apply(358.0);
        filter.apply(2.0);
        let out = filter.apply(0.0);
        assert!(out < 0.5 || out > 359.5, "expected ~0, got {}", out);
    }

    #[test]
    fn test_smooths_single_outlier() {
        let mut filter: HeadingFilter = HeadingFilter::new();
        for _ in 0..4 {
            filter.apply(90.0);
        }
        let out = filter.apply(140.0);
        assert!(out > 90.0 && out < 110.0, "outlier not damped: {}", out);
    }

    #[test]
    fn test_output_always_normalized() {
        let mut filter: HeadingFilter<3> = HeadingFilter::new();
        for raw in [-720.0, 359.999, 1e6, -0.0001, 721.0] {
            let out = filter.apply(raw);
            assert!((0.0..360.0).contains(&out), "{} -> {}", raw, out);
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter: HeadingFilter = HeadingFilter::new();
        filter.apply(90.0);
        filter.apply(100.0);

        filter.reset();
        assert!(filter.is_empty());

        let result = filter.apply(200.0);
        assert!((result - 200.0).abs() < 0.001);
    }
}
