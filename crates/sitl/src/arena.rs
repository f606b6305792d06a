//! Scenario description loaded from JSON.
//!
//! Coordinates are in centimetres with the origin at the south-west corner,
//! `x` east and `y` north. Headings are degrees clockwise from north.

use std::path::Path;

use serde::{Deserialize, Serialize};
use zumo_cup_core::parameters::RobotParams;
use zumo_cup_core::sensors::ColorClass;

use crate::error::SimulatorError;

/// Goal zone color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneColor {
    Red,
    Blue,
}

impl ZoneColor {
    pub fn class(self) -> ColorClass {
        match self {
            ZoneColor::Red => ColorClass::Red,
            ZoneColor::Blue => ColorClass::Blue,
        }
    }
}

/// Axis-aligned rectangle, `(x, y)` is the south-west corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub color: ZoneColor,
    pub area: Rect,
}

/// Inclined area; pitch is `angle_deg` when facing `uphill_heading_deg`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub area: Rect,
    pub angle_deg: f32,
    pub uphill_heading_deg: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CupConfig {
    pub x: f32,
    pub y: f32,
}

/// Robot that drives straight and bounces off the black border
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentConfig {
    pub x: f32,
    pub y: f32,
    pub heading_deg: f32,
    pub speed_cm_s: f32,
    #[serde(default = "default_opponent_radius")]
    pub radius_cm: f32,
}

fn default_opponent_radius() -> f32 {
    5.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width_cm: f32,
    pub height_cm: f32,
    /// Width of the black boundary band
    pub border_cm: f32,
    pub zones: Vec<Zone>,
    pub ramp: Option<Ramp>,
    pub cups: Vec<CupConfig>,
    pub cup_radius_cm: f32,
    pub opponent: Option<OpponentConfig>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width_cm: 150.0,
            height_cm: 150.0,
            border_cm: 8.0,
            zones: Vec::new(),
            ramp: None,
            cups: Vec::new(),
            cup_radius_cm: 3.5,
            opponent: None,
        }
    }
}

impl ArenaConfig {
    /// True inside the white playing field (inside the black band)
    pub fn in_field(&self, x: f32, y: f32) -> bool {
        x >= self.border_cm
            && x < self.width_cm - self.border_cm
            && y >= self.border_cm
            && y < self.height_cm - self.border_cm
    }

    pub fn in_bounds(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x <= self.width_cm && y >= 0.0 && y <= self.height_cm
    }
}

/// Robot geometry, start pose and drive response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub x: f32,
    pub y: f32,
    pub heading_deg: f32,
    /// Heading change in degrees per ms per unit of (left - right)
    pub turn_rate: f32,
    /// Forward speed in cm per ms per motor unit
    pub speed_scale: f32,
    /// Centre to front edge (ultrasonic sensor position)
    pub front_cm: f32,
    /// Centre to color sensor, along the heading
    pub color_sensor_cm: f32,
    /// Cups whose centre is within this forward distance are captured
    pub capture_reach_cm: f32,
    pub half_width_cm: f32,
    pub max_range_cm: f32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            x: 75.0,
            y: 40.0,
            heading_deg: 0.0,
            turn_rate: 0.0006,
            speed_scale: 0.00015,
            front_cm: 5.0,
            color_sensor_cm: 4.0,
            capture_reach_cm: 15.0,
            half_width_cm: 5.0,
            max_range_cm: 200.0,
        }
    }
}

/// Earth field as seen by the magnetometer, including board distortion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticConfig {
    pub declination_deg: f32,
    pub field: f32,
    pub hard_iron: [f32; 2],
    pub scale: [f32; 2],
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            declination_deg: -7.5,
            field: 1.0,
            hard_iron: [0.0, 0.0],
            scale: [1.0, 1.0],
        }
    }
}

/// Gaussian noise standard deviations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub mag: f32,
    pub range_cm: f32,
    pub rgb: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            mag: 0.005,
            range_cm: 0.2,
            rgb: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub target_heading_deg: f32,
    pub goal: ZoneColor,
    pub arena: ArenaConfig,
    pub robot: RobotConfig,
    pub magnetic: MagneticConfig,
    pub noise: NoiseConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            seed: 1,
            target_heading_deg: 0.0,
            goal: ZoneColor::Red,
            arena: ArenaConfig::default(),
            robot: RobotConfig::default(),
            magnetic: MagneticConfig::default(),
            noise: NoiseConfig::default(),
        }
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, SimulatorError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulatorError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        let arena = &self.arena;
        if arena.width_cm <= 2.0 * arena.border_cm || arena.height_cm <= 2.0 * arena.border_cm {
            return Err(SimulatorError::InvalidScenario(format!(
                "arena {}x{} leaves no field inside a {} cm border",
                arena.width_cm, arena.height_cm, arena.border_cm
            )));
        }
        if !arena.in_field(self.robot.x, self.robot.y) {
            return Err(SimulatorError::InvalidScenario(format!(
                "robot start ({}, {}) is outside the field",
                self.robot.x, self.robot.y
            )));
        }
        if let Some(cup) = arena.cups.iter().find(|c| !arena.in_field(c.x, c.y)) {
            return Err(SimulatorError::InvalidScenario(format!(
                "cup at ({}, {}) is outside the field",
                cup.x, cup.y
            )));
        }
        if arena.cup_radius_cm <= 0.0 || self.robot.speed_scale <= 0.0 {
            return Err(SimulatorError::InvalidScenario(
                "cup radius and speed scale must be positive".to_string(),
            ));
        }
        if self.magnetic.field <= 0.0 {
            return Err(SimulatorError::InvalidScenario(
                "magnetic field strength must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Robot parameters matching this arena's goal, target and declination
    pub fn robot_params(&self) -> RobotParams {
        let mut params = RobotParams::default();
        params.heading.declination_deg = self.magnetic.declination_deg;
        params.heading.target_heading_deg = self.target_heading_deg;
        params.color.goal = self.goal.class();
        params
    }
}
