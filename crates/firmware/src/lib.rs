#![cfg_attr(not(test), no_std)]

//! zumo_cup_firmware - Runtime for the zumo_cup robot
//!
//! This crate wires the platform-agnostic logic in `zumo_cup_core` to a
//! concrete robot platform.
//!
//! # Design Principles
//!
//! - **Single control loop**: one `ControlLoop::tick` per 20 ms cycle
//! - **Platform injection**: hardware reached only through `RobotPlatform`
//! - **defmt logging**: `log_*!` macros compile to defmt on target

// Platform implementations (embassy time source, mock platform)
pub mod platform;

// Firmware infrastructure (logging)
pub mod core;

// Control loop, calibration routines and status reporting
pub mod robot;

// Embassy tasks
#[cfg(feature = "pico2_w")]
pub mod tasks;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!)
// are exported at crate root via #[macro_export] in core::logging
