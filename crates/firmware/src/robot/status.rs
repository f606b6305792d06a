//! Throttled status reporting
//!
//! A status line is logged every `status_interval_ms` and immediately on
//! every mode change.

use zumo_cup_core::behavior::Behavior;

use crate::core::logging::{to_line, LogLine};

pub struct StatusReporter {
    interval_ms: u32,
    last_report_ms: Option<u64>,
    line: LogLine,
    reports: u32,
}

impl StatusReporter {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_report_ms: None,
            line: LogLine::new(),
            reports: 0,
        }
    }

    /// Report if due; returns true when a line was emitted.
    pub fn update(&mut self, now_ms: u64, mode_changed: bool, behavior: &Behavior) -> bool {
        let due = match self.last_report_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= u64::from(self.interval_ms),
        };
        if !(due || mode_changed) {
            return false;
        }

        self.last_report_ms = Some(now_ms);
        self.line = to_line(&behavior.status());
        self.reports = self.reports.saturating_add(1);
        crate::log_info!("{}", self.line.as_str());
        true
    }

    /// Most recent status line
    pub fn last_line(&self) -> &str {
        self.line.as_str()
    }

    pub fn reports(&self) -> u32 {
        self.reports
    }
}
