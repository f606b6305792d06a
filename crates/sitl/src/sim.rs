//! Arena physics and sensor synthesis.
//!
//! Differential-drive kinematics with no inertia: the heading rate follows
//! the wheel speed difference and the forward speed their mean. Sensors are
//! synthesized from the robot pose with seeded Gaussian noise, so a run is
//! reproducible for a given scenario seed.
//!
//! Cups are captured when their centre is inside the box in front of the
//! robot, travel with it, and are released when the robot reverses. A cup
//! released inside the goal zone counts as delivered and leaves the field.
//! Ranging is a single ray against discs, so an object stays visible while
//! the robot drives straight at it.

use std::collections::VecDeque;

use nalgebra::{Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zumo_cup_core::heading::wrap_360;
use zumo_cup_core::motor::MotorCommand;
use zumo_cup_core::sensors::RgbSample;
use zumo_cup_core::traits::TimeSource;

use crate::arena::{Scenario, ZoneColor};
use crate::platform::SimClock;

const GRAVITY: f32 = 9.81;
const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Raw color sensor readings per floor color
const RAW_BLACK: [f32; 3] = [60.0, 52.0, 62.0];
const RAW_WHITE: [f32; 3] = [255.0, 255.0, 255.0];
const RAW_RED: [f32; 3] = [230.0, 80.0, 90.0];
const RAW_BLUE: [f32; 3] = [70.0, 90.0, 230.0];

/// Robot pose in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    /// Degrees clockwise from north
    pub heading_deg: f32,
}

impl Pose {
    fn forward(&self) -> Vector2<f32> {
        let rad = self.heading_deg.to_radians();
        Vector2::new(rad.sin(), rad.cos())
    }

    /// Point `distance` ahead of the centre
    fn ahead(&self, distance: f32) -> Vector2<f32> {
        Vector2::new(self.x, self.y) + self.forward() * distance
    }

    /// (forward, lateral) offset of a point in the robot frame, lateral
    /// positive to the right
    fn to_body(&self, x: f32, y: f32) -> (f32, f32) {
        let rad = self.heading_deg.to_radians();
        let (dx, dy) = (x - self.x, y - self.y);
        (
            dx * rad.sin() + dy * rad.cos(),
            dx * rad.cos() - dy * rad.sin(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CupState {
    Free,
    Captured,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cup {
    pub x: f32,
    pub y: f32,
    pub state: CupState,
}

#[derive(Debug, Clone)]
struct Opponent {
    x: f32,
    y: f32,
    heading_deg: f32,
    speed_cm_ms: f32,
    radius_cm: f32,
}

pub struct Simulator {
    scenario: Scenario,
    clock: SimClock,
    rng: StdRng,
    pose: Pose,
    command: MotorCommand,
    cups: Vec<Cup>,
    opponent: Option<Opponent>,
    button_script: VecDeque<bool>,
    black_entries: u32,
    on_black: bool,
}

impl Simulator {
    pub fn new(scenario: Scenario, clock: SimClock) -> Self {
        let robot = &scenario.robot;
        let pose = Pose {
            x: robot.x,
            y: robot.y,
            heading_deg: wrap_360(robot.heading_deg),
        };
        let cups = scenario
            .arena
            .cups
            .iter()
            .map(|c| Cup {
                x: c.x,
                y: c.y,
                state: CupState::Free,
            })
            .collect();
        let opponent = scenario.arena.opponent.as_ref().map(|o| Opponent {
            x: o.x,
            y: o.y,
            heading_deg: o.heading_deg,
            speed_cm_ms: o.speed_cm_s / 1000.0,
            radius_cm: o.radius_cm,
        });

        Self {
            rng: StdRng::seed_from_u64(scenario.seed),
            scenario,
            clock,
            pose,
            command: MotorCommand::STOP,
            cups,
            opponent,
            button_script: VecDeque::new(),
            black_entries: 0,
            on_black: false,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Teleport the robot (test setup)
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn command(&self) -> MotorCommand {
        self.command
    }

    pub fn set_command(&mut self, command: MotorCommand) {
        self.command = command;
    }

    pub fn cups(&self) -> &[Cup] {
        &self.cups
    }

    pub fn cups_delivered(&self) -> usize {
        self.cups
            .iter()
            .filter(|c| c.state == CupState::Delivered)
            .count()
    }

    /// Times the color sensor moved onto the black band
    pub fn black_entries(&self) -> u32 {
        self.black_entries
    }

    /// Queue one press: released for one read, then pressed for one read.
    pub fn queue_press(&mut self) {
        self.button_script.push_back(false);
        self.button_script.push_back(true);
    }

    /// Advance physics by `dt_ms` and the shared clock with it.
    pub fn step(&mut self, dt_ms: u64) {
        let dt = dt_ms as f32;
        let robot = &self.scenario.robot;
        let left = f32::from(self.command.left);
        let right = f32::from(self.command.right);

        self.pose.heading_deg = wrap_360(self.pose.heading_deg + (left - right) * robot.turn_rate * dt);
        let speed = (left + right) / 2.0 * robot.speed_scale;
        let moved = self.pose.ahead(speed * dt);
        let arena = &self.scenario.arena;
        self.pose.x = moved.x.clamp(0.0, arena.width_cm);
        self.pose.y = moved.y.clamp(0.0, arena.height_cm);

        self.update_cups(speed);
        self.update_opponent(dt);

        let sensor = self.pose.ahead(self.scenario.robot.color_sensor_cm);
        let on_black = !self.scenario.arena.in_field(sensor.x, sensor.y);
        if on_black && !self.on_black {
            self.black_entries += 1;
        }
        self.on_black = on_black;

        self.clock.advance_ms(dt_ms);
    }

    fn update_cups(&mut self, speed: f32) {
        let robot = &self.scenario.robot;
        let arena = &self.scenario.arena;
        let hold = self.pose.ahead(robot.front_cm + arena.cup_radius_cm);
        let lateral_reach = robot.half_width_cm + arena.cup_radius_cm;
        let goal = self.scenario.goal;

        for cup in &mut self.cups {
            match cup.state {
                CupState::Captured if speed < 0.0 => {
                    cup.state = if zone_at(&self.scenario, cup.x, cup.y) == Some(goal) {
                        CupState::Delivered
                    } else {
                        CupState::Free
                    };
                }
                CupState::Captured => {
                    cup.x = hold.x;
                    cup.y = hold.y;
                }
                CupState::Free if speed >= 0.0 => {
                    let (forward, lateral) = self.pose.to_body(cup.x, cup.y);
                    if forward >= 0.0
                        && forward <= robot.capture_reach_cm
                        && lateral.abs() <= lateral_reach
                    {
                        cup.state = CupState::Captured;
                        cup.x = hold.x;
                        cup.y = hold.y;
                    }
                }
                _ => {}
            }
        }
    }

    fn update_opponent(&mut self, dt: f32) {
        let arena = &self.scenario.arena;
        let Some(opponent) = self.opponent.as_mut() else {
            return;
        };

        let rad = opponent.heading_deg.to_radians();
        let mut dx = rad.sin() * opponent.speed_cm_ms * dt;
        let mut dy = rad.cos() * opponent.speed_cm_ms * dt;
        let (lo, hi_x, hi_y) = (
            arena.border_cm + opponent.radius_cm,
            arena.width_cm - arena.border_cm - opponent.radius_cm,
            arena.height_cm - arena.border_cm - opponent.radius_cm,
        );
        if !(lo..=hi_x).contains(&(opponent.x + dx)) {
            dx = -dx;
        }
        if !(lo..=hi_y).contains(&(opponent.y + dy)) {
            dy = -dy;
        }
        opponent.x += dx;
        opponent.y += dy;
        opponent.heading_deg = wrap_360(dx.atan2(dy).to_degrees());
    }

    /// Opponent position, if present
    pub fn opponent_position(&self) -> Option<(f32, f32)> {
        self.opponent.as_ref().map(|o| (o.x, o.y))
    }

    fn gaussian_noise(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let u1: f32 = self.rng.gen::<f32>().max(f32::EPSILON);
        let u2: f32 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
        z * stddev
    }

    pub fn read_mag(&mut self) -> Vector2<f32> {
        let magnetic = self.scenario.magnetic.clone();
        let rad = (self.pose.heading_deg - magnetic.declination_deg).to_radians();
        let noise = self.scenario.noise.mag;
        Vector2::new(
            magnetic.hard_iron[0]
                + magnetic.scale[0] * magnetic.field * rad.cos()
                + self.gaussian_noise(noise),
            magnetic.hard_iron[1]
                + magnetic.scale[1] * magnetic.field * rad.sin()
                + self.gaussian_noise(noise),
        )
    }

    pub fn read_rgb(&mut self) -> RgbSample {
        let sensor = self.pose.ahead(self.scenario.robot.color_sensor_cm);
        let base = if !self.scenario.arena.in_field(sensor.x, sensor.y) {
            RAW_BLACK
        } else {
            match zone_at(&self.scenario, sensor.x, sensor.y) {
                Some(ZoneColor::Red) => RAW_RED,
                Some(ZoneColor::Blue) => RAW_BLUE,
                None => RAW_WHITE,
            }
        };
        let noise = self.scenario.noise.rgb;
        let mut channel = |v: f32| (v + self.gaussian_noise(noise)).clamp(0.0, 1023.0).round() as u16;
        RgbSample::new(channel(base[0]), channel(base[1]), channel(base[2]))
    }

    /// Pencil-beam ray cast from the front of the robot against cups still
    /// on the field and the opponent. A captured cup sits against the front
    /// and reads at the minimum range.
    pub fn read_echo_us(&mut self) -> Option<u32> {
        let robot = &self.scenario.robot;
        let cup_radius = self.scenario.arena.cup_radius_cm;

        let targets = self
            .cups
            .iter()
            .filter(|c| c.state != CupState::Delivered)
            .map(|c| (c.x, c.y, cup_radius))
            .chain(self.opponent.iter().map(|o| (o.x, o.y, o.radius_cm)));

        let nearest = targets
            .filter_map(|(x, y, radius)| {
                let (forward, lateral) = self.pose.to_body(x, y);
                (forward > 0.0 && lateral.abs() <= radius)
                    .then(|| forward - (radius * radius - lateral * lateral).sqrt() - robot.front_cm)
            })
            .fold(None, |best: Option<f32>, d| Some(best.map_or(d, |b| b.min(d))))?;

        let max_range = robot.max_range_cm;
        let distance = (nearest + self.gaussian_noise(self.scenario.noise.range_cm)).max(1.0);
        (distance <= max_range)
            .then(|| (distance * 2.0 / SPEED_OF_SOUND_CM_PER_US).round() as u32)
    }

    /// Nose-up pitch from the ramp under the robot
    pub fn pitch_deg(&self) -> f32 {
        match &self.scenario.arena.ramp {
            Some(ramp) if ramp.area.contains(self.pose.x, self.pose.y) => {
                ramp.angle_deg * (self.pose.heading_deg - ramp.uphill_heading_deg).to_radians().cos()
            }
            _ => 0.0,
        }
    }

    pub fn read_accel(&mut self) -> Vector3<f32> {
        let pitch = self.pitch_deg().to_radians();
        Vector3::new(GRAVITY * pitch.sin(), 0.0, GRAVITY * pitch.cos())
    }

    pub fn read_button(&mut self) -> bool {
        self.button_script.pop_front().unwrap_or(false)
    }
}

fn zone_at(scenario: &Scenario, x: f32, y: f32) -> Option<ZoneColor> {
    scenario
        .arena
        .zones
        .iter()
        .find(|z| z.area.contains(x, y))
        .map(|z| z.color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{CupConfig, NoiseConfig, Ramp, Rect, Zone};

    fn quiet(mut scenario: Scenario) -> Simulator {
        scenario.noise = NoiseConfig {
            mag: 0.0,
            range_cm: 0.0,
            rgb: 0.0,
        };
        Simulator::new(scenario, SimClock::new())
    }

    #[test]
    fn test_rotate_in_place() {
        let mut sim = quiet(Scenario::default());
        sim.set_command(MotorCommand::rotate(140));
        sim.step(1000);
        // 280 * 0.0006 deg/ms for 1 s
        assert!((sim.pose().heading_deg - 168.0).abs() < 1e-3);
        assert_eq!((sim.pose().x, sim.pose().y), (75.0, 40.0));
        assert_eq!(sim.now_ms(), 1000);
    }

    #[test]
    fn test_drive_north() {
        let mut sim = quiet(Scenario::default());
        sim.set_command(MotorCommand::straight(100));
        sim.step(1000);
        assert!((sim.pose().y - 55.0).abs() < 1e-3);
        assert!((sim.pose().x - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_mag_matches_heading_with_declination() {
        let mut sim = quiet(Scenario::default());
        sim.set_pose(Pose {
            x: 75.0,
            y: 40.0,
            heading_deg: 97.5,
        });
        let m = sim.read_mag();
        // Field points at 97.5 - (-7.5) = 105 degrees
        let angle = m.y.atan2(m.x).to_degrees();
        assert!((angle - 105.0).abs() < 1e-3);
    }

    #[test]
    fn test_floor_colors() {
        let mut scenario = Scenario::default();
        scenario.arena.zones.push(Zone {
            color: ZoneColor::Red,
            area: Rect {
                x: 8.0,
                y: 115.0,
                width: 134.0,
                height: 27.0,
            },
        });
        let mut sim = quiet(scenario);
        assert_eq!(sim.read_rgb(), RgbSample::new(255, 255, 255));

        sim.set_pose(Pose {
            x: 75.0,
            y: 120.0,
            heading_deg: 0.0,
        });
        assert_eq!(sim.read_rgb(), RgbSample::new(230, 80, 90));

        sim.set_pose(Pose {
            x: 75.0,
            y: 145.0,
            heading_deg: 0.0,
        });
        assert_eq!(sim.read_rgb(), RgbSample::new(60, 52, 62));
    }

    #[test]
    fn test_range_to_cup_ahead() {
        let mut scenario = Scenario::default();
        scenario.arena.cups.push(CupConfig { x: 75.0, y: 70.0 });
        let mut sim = quiet(scenario);
        // 30 cm centre distance - 3.5 radius - 5 front
        let echo = sim.read_echo_us().unwrap();
        let cm = echo as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0;
        assert!((cm - 21.5).abs() < 0.05);

        sim.set_pose(Pose {
            x: 75.0,
            y: 40.0,
            heading_deg: 90.0,
        });
        assert_eq!(sim.read_echo_us(), None);
    }

    #[test]
    fn test_capture_and_release_in_goal() {
        let mut scenario = Scenario::default();
        scenario.arena.cups.push(CupConfig { x: 75.0, y: 52.0 });
        scenario.arena.zones.push(Zone {
            color: ZoneColor::Red,
            area: Rect {
                x: 8.0,
                y: 60.0,
                width: 134.0,
                height: 30.0,
            },
        });
        let mut sim = quiet(scenario);

        sim.set_command(MotorCommand::straight(100));
        sim.step(20);
        assert_eq!(sim.cups()[0].state, CupState::Captured);
        let held_cm = sim.read_echo_us().unwrap() as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0;
        assert!(held_cm < 1.5);

        // Carry it 30 cm north, into the zone
        sim.step(2000);
        assert_eq!(sim.cups()[0].state, CupState::Captured);

        sim.set_command(MotorCommand::straight(-100));
        sim.step(20);
        assert_eq!(sim.cups()[0].state, CupState::Delivered);
        assert_eq!(sim.cups_delivered(), 1);
    }

    #[test]
    fn test_ramp_pitch_follows_heading() {
        let mut scenario = Scenario::default();
        scenario.arena.ramp = Some(Ramp {
            area: Rect {
                x: 60.0,
                y: 30.0,
                width: 30.0,
                height: 30.0,
            },
            angle_deg: 20.0,
            uphill_heading_deg: 0.0,
        });
        let mut sim = quiet(scenario);
        assert!((sim.pitch_deg() - 20.0).abs() < 1e-3);
        let accel = sim.read_accel();
        assert!((accel.x - GRAVITY * 20f32.to_radians().sin()).abs() < 1e-3);

        sim.set_pose(Pose {
            x: 75.0,
            y: 40.0,
            heading_deg: 180.0,
        });
        assert!((sim.pitch_deg() + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_black_entries_counted() {
        let mut sim = quiet(Scenario::default());
        sim.set_pose(Pose {
            x: 75.0,
            y: 130.0,
            heading_deg: 0.0,
        });
        sim.set_command(MotorCommand::straight(100));
        sim.step(1000);
        assert_eq!(sim.black_entries(), 1);
    }

    #[test]
    fn test_button_script() {
        let mut sim = quiet(Scenario::default());
        sim.queue_press();
        assert!(!sim.read_button());
        assert!(sim.read_button());
        assert!(!sim.read_button());
    }
}
