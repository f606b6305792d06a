//! zumo_cup_core - Pure no_std logic for the cup-delivery robot
//!
//! This crate contains platform-agnostic estimators, controllers and the
//! behavior state machine. Everything here is tested on host without any
//! feature flags or embassy dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Sensors, motors and time injected via traits
//!
//! # Modules
//!
//! - [`heading`]: Compass heading estimation and angle utilities
//! - [`control`]: PI heading controller
//! - [`motor`]: Motor commands and the driver trait
//! - [`sensors`]: Color classification, range and accelerometer processing
//! - [`stall`]: Heading-based stall detection
//! - [`climb`]: Slope detection and the climb maneuver
//! - [`behavior`]: Mode state machine
//! - [`parameters`]: Named parameter store and typed parameter groups
//! - [`traits`]: Platform abstractions (TimeSource, sensors, RobotPlatform)
//! - [`error`]: Calibration errors

#![no_std]

pub mod behavior;
pub mod climb;
pub mod control;
pub mod error;
pub mod heading;
pub mod motor;
pub mod parameters;
pub mod sensors;
pub mod stall;
pub mod traits;
