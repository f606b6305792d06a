//! Simulated platform for SITL.
//!
//! `SitlPlatform` exposes the shared [`Simulator`] through the same
//! peripheral traits the firmware drives on hardware. Every peripheral holds
//! a handle to the simulator; delays advance simulated time so the blocking
//! calibration routines run unchanged.

pub mod timer;

pub use timer::SimClock;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use nalgebra::{Vector2, Vector3};
use zumo_cup_core::motor::{MotorCommand, MotorDriver};
use zumo_cup_core::sensors::RgbSample;
use zumo_cup_core::traits::{
    Accelerometer, Button, ColorSensor, Magnetometer, RangeSensor, RobotPlatform,
};

use crate::sim::Simulator;

pub type SharedSim = Arc<Mutex<Simulator>>;

/// Lock the simulator, recovering the state if a previous holder panicked.
pub fn lock(sim: &SharedSim) -> MutexGuard<'_, Simulator> {
    sim.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SitlMotors {
    sim: SharedSim,
}

impl MotorDriver for SitlMotors {
    fn set_speeds(&mut self, command: MotorCommand) {
        lock(&self.sim).set_command(command);
    }
}

pub struct SitlMagnetometer {
    sim: SharedSim,
}

impl Magnetometer for SitlMagnetometer {
    fn read_mag(&mut self) -> Vector2<f32> {
        lock(&self.sim).read_mag()
    }
}

pub struct SitlColorSensor {
    sim: SharedSim,
}

impl ColorSensor for SitlColorSensor {
    fn read_rgb(&mut self) -> RgbSample {
        lock(&self.sim).read_rgb()
    }
}

pub struct SitlRangeSensor {
    sim: SharedSim,
}

impl RangeSensor for SitlRangeSensor {
    fn read_echo_us(&mut self) -> Option<u32> {
        lock(&self.sim).read_echo_us()
    }
}

pub struct SitlAccelerometer {
    sim: SharedSim,
}

impl Accelerometer for SitlAccelerometer {
    fn read_accel(&mut self) -> Vector3<f32> {
        lock(&self.sim).read_accel()
    }
}

pub struct SitlButton {
    sim: SharedSim,
}

impl Button for SitlButton {
    fn is_pressed(&mut self) -> bool {
        lock(&self.sim).read_button()
    }
}

/// Simulated robot hardware backed by a shared [`Simulator`].
pub struct SitlPlatform {
    sim: SharedSim,
    motors: SitlMotors,
    mag: SitlMagnetometer,
    color: SitlColorSensor,
    range: SitlRangeSensor,
    accel: SitlAccelerometer,
    button: SitlButton,
    /// Sub-millisecond delay carried to the next call
    pending_ns: u64,
}

impl SitlPlatform {
    pub fn new(sim: SharedSim) -> Self {
        Self {
            motors: SitlMotors { sim: sim.clone() },
            mag: SitlMagnetometer { sim: sim.clone() },
            color: SitlColorSensor { sim: sim.clone() },
            range: SitlRangeSensor { sim: sim.clone() },
            accel: SitlAccelerometer { sim: sim.clone() },
            button: SitlButton { sim: sim.clone() },
            sim,
            pending_ns: 0,
        }
    }

    pub fn sim(&self) -> &SharedSim {
        &self.sim
    }
}

impl DelayNs for SitlPlatform {
    fn delay_ns(&mut self, ns: u32) {
        self.pending_ns += u64::from(ns);
        let whole_ms = self.pending_ns / 1_000_000;
        if whole_ms > 0 {
            self.pending_ns %= 1_000_000;
            lock(&self.sim).step(whole_ms);
        }
    }
}

impl RobotPlatform for SitlPlatform {
    type Motors = SitlMotors;
    type Mag = SitlMagnetometer;
    type Color = SitlColorSensor;
    type Range = SitlRangeSensor;
    type Accel = SitlAccelerometer;
    type Btn = SitlButton;

    fn motors(&mut self) -> &mut SitlMotors {
        &mut self.motors
    }

    fn magnetometer(&mut self) -> &mut SitlMagnetometer {
        &mut self.mag
    }

    fn color_sensor(&mut self) -> &mut SitlColorSensor {
        &mut self.color
    }

    fn range_sensor(&mut self) -> &mut SitlRangeSensor {
        &mut self.range
    }

    fn accelerometer(&mut self) -> &mut SitlAccelerometer {
        &mut self.accel
    }

    fn button(&mut self) -> &mut SitlButton {
        &mut self.button
    }
}
