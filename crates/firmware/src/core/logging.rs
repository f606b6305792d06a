//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - Embedded (pico2_w): Uses defmt
//! - Host tests: Uses println!
//! - Host non-test: No-op
//!
//! defmt only formats its own `Format` types, so values that implement
//! `core::fmt::Display` are rendered into a [`LogLine`] first:
//!
//! ```ignore
//! crate::log_warn!("Calibration failed: {}", to_line(&err).as_str());
//! ```

use core::fmt::{self, Write};

use heapless::String;

/// Maximum rendered line length in bytes
pub const LOG_LINE_SIZE: usize = 192;

/// Fixed-capacity rendered log line
pub type LogLine = String<LOG_LINE_SIZE>;

/// Render a `Display` value into a [`LogLine`], truncating on overflow.
pub fn to_line(value: &dyn fmt::Display) -> LogLine {
    let mut line = LogLine::new();
    let mut writer = Truncating(&mut line);
    let _ = write!(writer, "{}", value);
    line
}

/// Writer that keeps as much of the output as fits
struct Truncating<'a>(&'a mut LogLine);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_line_renders_display() {
        let line = to_line(&format_args!("mode={} hdg={:.1}", "SEARCH", 12.34));
        assert_eq!(line.as_str(), "mode=SEARCH hdg=12.3");
    }

    #[test]
    fn test_to_line_truncates() {
        let long = "x".repeat(LOG_LINE_SIZE + 10);
        let line = to_line(&long);
        assert_eq!(line.len(), LOG_LINE_SIZE);
    }

    #[test]
    fn test_macros_expand_on_host() {
        crate::log_info!("info {}", 1);
        crate::log_warn!("warn {}", "two");
        crate::log_error!("error");
        crate::log_debug!("debug {:?}", [3]);
    }
}
