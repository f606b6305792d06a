//! Angle arithmetic on compass headings
//!
//! All headings are in degrees, clockwise from magnetic north. Every function
//! here returns normalized values so callers never see 360.0 or -180.0.

use libm::{atan2f, cosf, sinf, sqrtf};

const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Normalize an angle into [0, 360).
///
/// Non-finite input maps to 0.0 so a bad sample can never leak out of range.
pub fn wrap_360(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    // -1e-6 + 360.0 rounds to 360.0 in f32
    if a >= 360.0 {
        a -= 360.0;
    }
    a
}

/// Normalize an angle into (-180, 180].
pub fn wrap_180(angle: f32) -> f32 {
    let a = wrap_360(angle);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Signed shortest angular distance from `current` to `target`.
///
/// Positive means the target lies clockwise of the current heading.
pub fn heading_error(target: f32, current: f32) -> f32 {
    wrap_180(target - current)
}

/// Heading in [0, 360) of a planar vector, measured with `atan2(y, x)`.
pub fn heading_from_vector(x: f32, y: f32) -> f32 {
    wrap_360(atan2f(y, x) * RAD_TO_DEG)
}

/// Circular mean of a set of headings.
///
/// Averages the unit vectors so 359° and 1° give 0°, not 180°. Returns `None`
/// for an empty set or when the vectors cancel out (e.g. 0° and 180°).
pub fn circular_mean(headings: &[f32]) -> Option<f32> {
    if headings.is_empty() {
        return None;
    }

    let (sum_sin, sum_cos) = headings.iter().fold((0.0f32, 0.0f32), |(s, c), &h| {
        let rad = h * DEG_TO_RAD;
        (s + sinf(rad), c + cosf(rad))
    });

    let resultant = sqrtf(sum_sin * sum_sin + sum_cos * sum_cos);
    if resultant < 1e-4 * headings.len() as f32 {
        return None;
    }

    Some(wrap_360(atan2f(sum_sin, sum_cos) * RAD_TO_DEG))
}
