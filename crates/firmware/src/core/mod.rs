//! Firmware infrastructure shared by the robot modules
//!
//! Logging macros (`log_info!`, `log_warn!`, `log_error!`, `log_debug!`) are
//! exported at the crate root via `#[macro_export]`.

pub mod logging;
