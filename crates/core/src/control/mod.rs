//! Closed-loop controllers

pub mod pi;

pub use pi::{PiConfig, PiController};
