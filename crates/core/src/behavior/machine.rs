//! Behavior state machine
//!
//! [`Behavior`] owns every estimator and controller and turns one
//! [`SensorFrame`] into one [`MotorCommand`] per control cycle:
//!
//! 1. refresh heading, color, range, pitch and the slope/stall detectors
//! 2. evaluate the exit conditions of the current mode
//! 3. on a transition, record the previous mode and reset mode-local state
//! 4. compute the motor command for the (possibly new) mode
//!
//! Driving modes (SEARCH, APPROACH, ESCAPE, MOVE) share global checks, in
//! priority order: BLACK floor → AVOID, stall → STACK, slope → CLIMB. The
//! climb maneuver drives too, so CLIMB also yields to BLACK floor.

use libm::fabsf;
use nalgebra::{Vector2, Vector3};

use super::mode::Mode;
use super::state::{RobotState, Transition};
use super::status::StatusSnapshot;
use crate::climb::{ClimbController, SlopeDetector, SlopeEvent};
use crate::control::PiController;
use crate::heading::{heading_error, CompassCalibration, CompassEstimator};
use crate::motor::MotorCommand;
use crate::parameters::RobotParams;
use crate::sensors::{
    AccelCalibration, ColorCalibration, ColorClass, ColorTracker, RangeSample, RgbSample,
    StaticCheck, StaticVerdict,
};
use crate::stall::{MotionIntent, StallDetector, StallVerdict};

/// Heading tolerance for the climb rotation phases (degrees)
const CLIMB_HEADING_TOLERANCE_DEG: f32 = 5.0;

/// Raw sensor readings for one control cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorFrame {
    /// Horizontal magnetometer axes
    pub mag: Vector2<f32>,
    pub rgb: RgbSample,
    /// Echo round trip, `None` on timeout
    pub echo_us: Option<u32>,
    /// Accelerometer (m/s²)
    pub accel: Vector3<f32>,
    /// A new button press since the previous frame
    pub button: bool,
}

impl Default for SensorFrame {
    fn default() -> Self {
        Self {
            mag: Vector2::new(1.0, 0.0),
            rgb: RgbSample::default(),
            echo_us: None,
            accel: Vector3::new(0.0, 0.0, 9.81),
            button: false,
        }
    }
}

/// Result of one control cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub command: MotorCommand,
    pub transition: Option<Transition>,
}

/// Per-cycle sensor interpretation shared by exit checks and commands
struct Readings {
    heading: f32,
    slope: SlopeEvent,
    stall: StallVerdict,
}

pub struct Behavior {
    params: RobotParams,
    state: RobotState,
    compass: CompassEstimator,
    color: ColorTracker,
    range: RangeSample,
    accel_calibration: AccelCalibration,
    pitch_deg: f32,
    pi: PiController,
    static_check: StaticCheck,
    stall: StallDetector,
    slope: SlopeDetector,
    climb: ClimbController,
    zone_hits: u8,
    last_seen_ms: u64,
    last_tick_ms: Option<u64>,
    command: MotorCommand,
}

impl Behavior {
    pub fn new(params: RobotParams) -> Self {
        let climb_config = params
            .climb
            .climb_config(params.drive.forward_speed, CLIMB_HEADING_TOLERANCE_DEG);
        Self {
            state: RobotState::new(0),
            compass: CompassEstimator::new(params.heading.declination_deg),
            color: ColorTracker::new(params.color.thresholds()),
            range: RangeSample::NO_OBJECT,
            accel_calibration: AccelCalibration::default(),
            pitch_deg: 0.0,
            pi: PiController::new(params.heading.to_pi_config()),
            static_check: StaticCheck::new(params.range.static_check_config()),
            stall: StallDetector::new(params.stall.to_config()),
            slope: SlopeDetector::new(params.climb.slope_config()),
            climb: ClimbController::new(climb_config),
            zone_hits: 0,
            last_seen_ms: 0,
            last_tick_ms: None,
            command: MotorCommand::STOP,
            params,
        }
    }

    pub fn params(&self) -> &RobotParams {
        &self.params
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    /// Filtered heading (degrees)
    pub fn heading(&self) -> f32 {
        self.compass.heading()
    }

    pub fn color(&self) -> ColorClass {
        self.color.current()
    }

    pub fn range(&self) -> RangeSample {
        self.range
    }

    pub fn pitch_deg(&self) -> f32 {
        self.pitch_deg
    }

    /// Command issued by the last tick
    pub fn command(&self) -> MotorCommand {
        self.command
    }

    pub fn set_compass_calibration(&mut self, calibration: CompassCalibration) {
        self.compass.set_calibration(calibration);
    }

    pub fn set_color_calibration(&mut self, calibration: ColorCalibration) {
        self.color.set_calibration(calibration);
    }

    pub fn set_accel_calibration(&mut self, calibration: AccelCalibration) {
        self.accel_calibration = calibration;
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            mode: self.state.mode(),
            heading_deg: self.compass.heading(),
            raw_heading_deg: self.compass.raw_heading(),
            color: self.color.current(),
            rgb: self.color.normalized(),
            range: self.range,
            pitch_deg: self.pitch_deg,
            command: self.command,
            cups_delivered: self.state.cups_delivered(),
            search_rotations: self.state.search_rotations(),
            climb_phase: self.state.climb_phase(),
        }
    }

    /// Run one control cycle.
    pub fn tick(&mut self, now_ms: u64, frame: &SensorFrame) -> TickOutput {
        let dt_ms = match self.last_tick_ms {
            Some(last) => u32::try_from(now_ms.saturating_sub(last)).unwrap_or(u32::MAX),
            None => 0,
        };
        self.last_tick_ms = Some(now_ms);

        let readings = self.refresh(now_ms, frame);

        let transition = self
            .next_mode(now_ms, &readings, frame.button)
            .map(|next| self.enter(next, now_ms, readings.heading));

        // The entry cycle contributes nothing to the PI integral
        let pi_dt = if transition.is_some() { 0 } else { dt_ms };
        self.command = self.command_for(now_ms, &readings, pi_dt);

        TickOutput {
            command: self.command,
            transition,
        }
    }

    fn refresh(&mut self, now_ms: u64, frame: &SensorFrame) -> Readings {
        let heading = self.compass.update(frame.mag);
        self.color.update(frame.rgb);
        self.range = RangeSample::from_echo(frame.echo_us, self.params.range.max_range_cm);
        self.pitch_deg = self.accel_calibration.pitch_deg(frame.accel);
        let slope = self.slope.update(now_ms, self.pitch_deg);

        let intent = if self.state.stall_check_allowed() {
            self.motion_intent()
        } else {
            None
        };
        let stall = self.stall.update(now_ms, heading, intent);

        if self.state.mode() == Mode::Search {
            self.state.update_search(
                now_ms,
                heading,
                self.params.behavior.search_rotations,
                self.params.behavior.search_wander_ms,
            );
        }

        Readings {
            heading,
            slope,
            stall,
        }
    }

    fn motion_intent(&self) -> Option<MotionIntent> {
        match self.state.mode() {
            Mode::Search if self.state.is_wandering() => Some(MotionIntent::Straight),
            Mode::Search => Some(MotionIntent::Rotate),
            Mode::Approach => Some(MotionIntent::Straight),
            Mode::Escape | Mode::Move => Some(MotionIntent::Hold {
                target: self.params.heading.target_heading_deg,
            }),
            _ => None,
        }
    }

    fn target_error(&self, heading: f32) -> f32 {
        heading_error(self.params.heading.target_heading_deg, heading)
    }

    fn next_mode(&mut self, now_ms: u64, readings: &Readings, button: bool) -> Option<Mode> {
        let mode = self.state.mode();

        if button {
            return match mode {
                Mode::Init => Some(Mode::Direction),
                Mode::Stop => None,
                _ => Some(Mode::Stop),
            };
        }

        let on_black = self.color.current() == ColorClass::Black;
        if on_black && (mode.is_driving() || mode == Mode::Climb) {
            return Some(Mode::Avoid);
        }
        if mode.is_driving() {
            if readings.stall == StallVerdict::Stuck {
                return Some(Mode::Stack);
            }
            if readings.slope == SlopeEvent::SlopeStart {
                return Some(Mode::Climb);
            }
        }

        let elapsed = self.state.elapsed_in_state(now_ms);
        let behavior = &self.params.behavior;
        let heading = &self.params.heading;
        let timed_out = |limit_ms: u32| elapsed >= u64::from(limit_ms);

        match mode {
            Mode::Init | Mode::Stop => None,
            Mode::Direction => {
                let aligned =
                    fabsf(self.target_error(readings.heading)) <= heading.align_tolerance_deg;
                (aligned || timed_out(heading.turn_timeout_ms)).then_some(Mode::Search)
            }
            Mode::Search => {
                let ignored = self.state.just_delivered()
                    && fabsf(self.target_error(readings.heading)) <= behavior.deposit_cone_deg;
                // Turn past an object just judged moving before looking again
                let holdoff = self.state.previous_mode() == Some(Mode::CheckStatic)
                    && !timed_out(behavior.redetect_holdoff_ms);
                (self.range.within(self.params.range.detect_range_cm) && !ignored && !holdoff)
                    .then_some(Mode::CheckStatic)
            }
            Mode::CheckStatic => match self.static_check.update(now_ms, self.range) {
                StaticVerdict::Static => Some(Mode::Approach),
                StaticVerdict::Moving => Some(Mode::Search),
                StaticVerdict::Pending => None,
            },
            Mode::Approach => {
                if self.range.within(self.params.range.contact_range_cm) {
                    return Some(Mode::TurnToTarget);
                }
                if self.range.within(self.params.range.detect_range_cm) {
                    self.last_seen_ms = now_ms;
                }
                let lost =
                    now_ms.saturating_sub(self.last_seen_ms) > u64::from(behavior.approach_lost_ms);
                (lost || timed_out(behavior.approach_timeout_ms)).then_some(Mode::Search)
            }
            Mode::TurnToTarget => {
                if fabsf(self.target_error(readings.heading)) <= heading.align_tolerance_deg {
                    Some(Mode::WaitAfterTurn)
                } else if timed_out(heading.turn_timeout_ms) {
                    Some(Mode::TurnToTarget)
                } else {
                    None
                }
            }
            Mode::WaitAfterTurn => {
                if !timed_out(behavior.wait_after_turn_ms) {
                    None
                } else if fabsf(self.target_error(readings.heading))
                    <= heading.settle_tolerance_deg
                {
                    Some(Mode::Escape)
                } else {
                    Some(Mode::TurnToTarget)
                }
            }
            Mode::Escape => timed_out(behavior.escape_ms).then_some(Mode::Move),
            Mode::Move => {
                if self.color.current() == self.params.color.goal {
                    Some(Mode::CheckZone)
                } else {
                    timed_out(behavior.move_timeout_ms).then_some(Mode::Search)
                }
            }
            Mode::CheckZone => {
                if self.color.current() != self.params.color.goal {
                    return Some(Mode::Move);
                }
                self.zone_hits = self.zone_hits.saturating_add(1);
                if self.zone_hits >= self.params.color.zone_confirm_samples {
                    Some(Mode::Deposit)
                } else {
                    timed_out(behavior.zone_timeout_ms).then_some(Mode::Move)
                }
            }
            Mode::Deposit => timed_out(behavior.deposit_reverse_ms).then_some(Mode::Search),
            Mode::Avoid => timed_out(behavior.avoid_reverse_ms + behavior.avoid_rotate_ms)
                .then_some(Mode::Search),
            Mode::Stack => timed_out(behavior.stack_reverse_ms + behavior.stack_rotate_ms)
                .then_some(self.state.resume_mode()),
            Mode::Climb => self.climb.is_done().then_some(self.state.resume_mode()),
        }
    }

    fn enter(&mut self, next: Mode, now_ms: u64, heading: f32) -> Transition {
        let transition = self.state.transition(next, now_ms);

        self.stall.reset();
        if next.uses_heading_control() {
            self.pi.reset();
        }

        match next {
            Mode::CheckStatic => self.static_check.restart(),
            Mode::Approach => self.last_seen_ms = now_ms,
            Mode::CheckZone => self.zone_hits = 0,
            Mode::Climb => self.climb.start(now_ms, heading),
            _ => {}
        }

        transition
    }

    fn command_for(&mut self, now_ms: u64, readings: &Readings, pi_dt: u32) -> MotorCommand {
        let drive = &self.params.drive;
        let behavior = &self.params.behavior;
        let target = self.params.heading.target_heading_deg;
        let elapsed = self.state.elapsed_in_state(now_ms);
        let reverse = MotorCommand::straight(-drive.reverse_speed);

        match self.state.mode() {
            Mode::Init
            | Mode::Stop
            | Mode::CheckStatic
            | Mode::WaitAfterTurn
            | Mode::CheckZone => MotorCommand::STOP,
            Mode::Direction | Mode::TurnToTarget => {
                MotorCommand::turn(self.pi.update(target, readings.heading, pi_dt))
            }
            Mode::Search if self.state.is_wandering() => {
                MotorCommand::straight(drive.forward_speed)
            }
            Mode::Search => MotorCommand::rotate(drive.rotate_speed),
            Mode::Approach => MotorCommand::straight(drive.forward_speed),
            Mode::Escape => MotorCommand::steer(
                drive.escape_speed,
                self.pi.update(target, readings.heading, pi_dt),
            ),
            Mode::Move => MotorCommand::steer(
                drive.move_speed,
                self.pi.update(target, readings.heading, pi_dt),
            ),
            Mode::Deposit => reverse,
            Mode::Avoid if elapsed < u64::from(behavior.avoid_reverse_ms) => reverse,
            Mode::Avoid => MotorCommand::rotate(drive.avoid_speed),
            Mode::Stack if elapsed < u64::from(behavior.stack_reverse_ms) => reverse,
            Mode::Stack => MotorCommand::rotate(drive.rotate_speed),
            Mode::Climb => {
                let summit = readings.slope == SlopeEvent::Summit;
                let command = self.climb.step(now_ms, readings.heading, summit);
                self.state.set_climb_phase(self.climb.phase().index());
                command
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climb::ClimbPhase;
    use crate::heading::wrap_360;
    use libm::{cosf, sinf};

    const DT: u64 = 20;
    const WHITE: RgbSample = RgbSample::new(255, 255, 255);
    const BLACK: RgbSample = RgbSample::new(60, 52, 62);
    const RED: RgbSample = RgbSample::new(230, 80, 90);

    /// Degrees per ms per unit of (left - right)
    const TURN_RATE: f32 = 0.0006;
    /// cm per ms per speed unit
    const SPEED_SCALE: f32 = 0.00015;

    fn echo_for(cm: f32) -> u32 {
        (cm * 2.0 / 0.0343) as u32
    }

    fn mag_at(heading_deg: f32) -> Vector2<f32> {
        let rad = heading_deg * core::f32::consts::PI / 180.0;
        Vector2::new(cosf(rad), sinf(rad))
    }

    /// White floor, level, nothing in range, facing `heading_deg`
    fn frame_facing(heading_deg: f32) -> SensorFrame {
        SensorFrame {
            mag: mag_at(heading_deg),
            rgb: WHITE,
            ..SensorFrame::default()
        }
    }

    fn test_params() -> RobotParams {
        let mut params = RobotParams::default();
        params.heading.declination_deg = 0.0;
        params.heading.target_heading_deg = 200.0;
        params
    }

    /// Robot turning in place with one static object at a fixed bearing
    /// that gets closer while driving straight.
    struct World {
        now: u64,
        heading: f32,
        object_bearing: f32,
        object_cm: f32,
        rgb: RgbSample,
        accel: Vector3<f32>,
        button: bool,
    }

    impl World {
        fn new(heading: f32) -> Self {
            Self {
                now: 0,
                heading,
                object_bearing: 120.0,
                object_cm: 30.0,
                rgb: WHITE,
                accel: Vector3::new(0.0, 0.0, 9.81),
                button: false,
            }
        }

        fn frame(&mut self) -> SensorFrame {
            let in_beam = fabsf(heading_error(self.object_bearing, self.heading)) < 10.0;
            SensorFrame {
                mag: mag_at(self.heading),
                rgb: self.rgb,
                echo_us: in_beam.then(|| echo_for(self.object_cm)),
                accel: self.accel,
                button: core::mem::take(&mut self.button),
            }
        }

        fn step(&mut self, behavior: &mut Behavior) -> TickOutput {
            self.now += DT;
            let frame = self.frame();
            let out = behavior.tick(self.now, &frame);
            let cmd = out.command;
            let differential = cmd.left as f32 - cmd.right as f32;
            self.heading = wrap_360(self.heading + differential * TURN_RATE * DT as f32);
            if cmd.left == cmd.right {
                let travelled = cmd.left as f32 * SPEED_SCALE * DT as f32;
                self.object_cm = (self.object_cm - travelled).max(0.0);
            }
            out
        }

        /// Step until the mode becomes `target`, returning that transition
        fn run_until(&mut self, behavior: &mut Behavior, target: Mode, max_ms: u64) -> Transition {
            let deadline = self.now + max_ms;
            while self.now < deadline {
                if let Some(t) = self.step(behavior).transition {
                    if t.to == target {
                        return t;
                    }
                }
            }
            panic!(
                "did not reach {} within {} ms, stuck in {}",
                target, max_ms, behavior.mode()
            );
        }
    }

    fn started(world: &mut World, behavior: &mut Behavior) {
        world.step(behavior);
        world.button = true;
        world.run_until(behavior, Mode::Direction, 100);
    }

    #[test]
    fn test_init_waits_for_button() {
        let mut behavior = Behavior::new(test_params());
        let mut world = World::new(0.0);
        for _ in 0..50 {
            let out = world.step(&mut behavior);
            assert_eq!(out.command, MotorCommand::STOP);
            assert!(out.transition.is_none());
        }
        assert_eq!(behavior.mode(), Mode::Init);
    }

    #[test]
    fn test_direction_aligns_then_searches() {
        let mut behavior = Behavior::new(test_params());
        let mut world = World::new(0.0);
        started(&mut world, &mut behavior);

        world.run_until(&mut behavior, Mode::Search, 5000);
        assert!(fabsf(heading_error(200.0, behavior.heading())) <= 3.0);
    }

    #[test]
    fn test_search_to_aligned_turn() {
        let mut behavior = Behavior::new(test_params());
        let mut world = World::new(0.0);
        started(&mut world, &mut behavior);

        world.run_until(&mut behavior, Mode::Search, 5000);
        let t = world.run_until(&mut behavior, Mode::CheckStatic, 10_000);
        assert_eq!(t.from, Mode::Search);
        assert!(behavior.state().object_detected());

        let t = world.run_until(&mut behavior, Mode::Approach, 2000);
        assert_eq!(t.from, Mode::CheckStatic);

        let t = world.run_until(&mut behavior, Mode::TurnToTarget, 5000);
        assert_eq!(t.from, Mode::Approach);

        let t = world.run_until(&mut behavior, Mode::WaitAfterTurn, 5000);
        assert_eq!(t.from, Mode::TurnToTarget);
        assert!(
            fabsf(heading_error(200.0, behavior.heading())) <= 3.0,
            "heading {} not aligned",
            behavior.heading()
        );
    }

    #[test]
    fn test_black_from_search_avoids_within_one_cycle() {
        let mut behavior = Behavior::new(test_params());
        let mut world = World::new(200.0);
        world.object_bearing = 20.0;
        started(&mut world, &mut behavior);
        world.run_until(&mut behavior, Mode::Search, 5000);

        world.rgb = BLACK;
        let out = world.step(&mut behavior);
        let t = out.transition.unwrap();
        assert_eq!((t.from, t.to), (Mode::Search, Mode::Avoid));
        assert_eq!(out.command, MotorCommand::straight(-140));

        world.rgb = WHITE;
        world.run_until(&mut behavior, Mode::Search, 2000);
    }

    #[test]
    fn test_black_overrides_every_driving_mode() {
        for mode in [Mode::Approach, Mode::Escape, Mode::Move] {
            let mut behavior = Behavior::new(test_params());
            behavior.state.transition(mode, 0);
            let frame = SensorFrame {
                rgb: BLACK,
                ..frame_facing(0.0)
            };
            let out = behavior.tick(20, &frame);
            assert_eq!(out.transition.map(|t| t.to), Some(Mode::Avoid), "{}", mode);
        }
    }

    #[test]
    fn test_black_during_climb_avoids() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::Search, 0);
        behavior.enter(Mode::Climb, 0, 200.0);

        // Level white floor: reverse, then the left rotation times out
        let mut now = 0;
        while behavior.climb.phase() < ClimbPhase::WideArc && now < 5000 {
            now += DT;
            behavior.tick(now, &frame_facing(200.0));
        }
        assert_eq!(behavior.mode(), Mode::Climb);
        assert_eq!(behavior.climb.phase(), ClimbPhase::WideArc);

        let black = SensorFrame {
            rgb: BLACK,
            ..frame_facing(200.0)
        };
        let out = behavior.tick(now + DT, &black);
        let t = out.transition.unwrap();
        assert_eq!((t.from, t.to), (Mode::Climb, Mode::Avoid));
        assert_eq!(out.command, MotorCommand::straight(-140));
    }

    #[test]
    fn test_button_stops_and_stop_is_absorbing() {
        let mut behavior = Behavior::new(test_params());
        let mut world = World::new(0.0);
        started(&mut world, &mut behavior);

        world.button = true;
        let t = world.step(&mut behavior).transition.unwrap();
        assert_eq!(t.to, Mode::Stop);

        world.button = true;
        world.rgb = BLACK;
        for _ in 0..20 {
            let out = world.step(&mut behavior);
            assert!(out.transition.is_none());
            assert_eq!(out.command, MotorCommand::STOP);
        }
    }

    #[test]
    fn test_pi_integral_zero_on_turn_entry() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::WaitAfterTurn, 0);
        behavior.tick(0, &frame_facing(0.0));

        // Heading 0, target 200: not settled, so back to TURN_TO_TARGET
        let out = behavior.tick(1000, &frame_facing(0.0));
        assert_eq!(out.transition.map(|t| t.to), Some(Mode::TurnToTarget));
        assert_eq!(behavior.pi.integral(), 0.0);
    }

    #[test]
    fn test_turn_timeout_reenters_with_fresh_integral() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::TurnToTarget, 0);
        let frame = frame_facing(0.0);

        let mut now = 0;
        let mut reentered = None;
        while now < 5000 && reentered.is_none() {
            now += DT;
            reentered = behavior.tick(now, &frame).transition;
        }
        let t = reentered.unwrap();
        assert_eq!((t.from, t.to), (Mode::TurnToTarget, Mode::TurnToTarget));
        assert_eq!(t.at_ms, 4000);
        assert_eq!(behavior.pi.integral(), 0.0);
    }

    #[test]
    fn test_zone_confirmation_and_delivery() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::Move, 0);
        let red = SensorFrame {
            rgb: RED,
            ..frame_facing(200.0)
        };

        let out = behavior.tick(20, &red);
        assert_eq!(out.transition.map(|t| t.to), Some(Mode::CheckZone));
        assert_eq!(out.command, MotorCommand::STOP);

        let mut now = 20;
        let mut delivered = false;
        for _ in 0..10 {
            now += DT;
            if let Some(t) = behavior.tick(now, &red).transition {
                assert_eq!(t.to, Mode::Deposit);
                delivered = true;
                break;
            }
        }
        assert!(delivered);
        assert_eq!(behavior.state().cups_delivered(), 1);
        assert_eq!(behavior.command(), MotorCommand::straight(-140));
    }

    #[test]
    fn test_zone_rejected_on_non_goal_reading() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::Move, 0);
        let red = SensorFrame {
            rgb: RED,
            ..frame_facing(0.0)
        };

        behavior.tick(20, &red);
        assert_eq!(behavior.mode(), Mode::CheckZone);
        let out = behavior.tick(40, &frame_facing(0.0));
        assert_eq!(out.transition.map(|t| t.to), Some(Mode::Move));
        assert_eq!(behavior.state().cups_delivered(), 0);
    }

    #[test]
    fn test_stall_in_approach_recovers_then_resumes() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::Approach, 0);

        let with_object = |deg: f32| SensorFrame {
            echo_us: Some(echo_for(30.0)),
            ..frame_facing(deg)
        };

        // Heading swings while commanded straight
        let mut now = 0;
        let mut heading = 0.0;
        let mut stacked = None;
        while now < 2000 && stacked.is_none() {
            now += DT;
            heading += 4.0;
            stacked = behavior
                .tick(now, &with_object(heading))
                .transition
                .filter(|t| t.to == Mode::Stack);
        }
        assert_eq!(stacked.unwrap().from, Mode::Approach);
        assert_eq!(behavior.command(), MotorCommand::straight(-140));

        // Reverse, rotate, then back to APPROACH
        let mut resumed = None;
        while now < 4000 && resumed.is_none() {
            now += DT;
            resumed = behavior.tick(now, &with_object(heading)).transition;
        }
        assert_eq!(resumed.map(|t| t.to), Some(Mode::Approach));
    }

    #[test]
    fn test_stall_in_move_recovers_once() {
        let mut behavior = Behavior::new(test_params());
        let mut world = World::new(200.0);
        world.object_bearing = 20.0;
        behavior.state.transition(Mode::Move, 0);

        // Shoved clockwise faster than the controller can hold
        let mut stacked = None;
        while world.now < 2000 && stacked.is_none() {
            world.heading = wrap_360(world.heading + 4.0);
            stacked = world
                .step(&mut behavior)
                .transition
                .filter(|t| t.to == Mode::Stack);
        }
        assert_eq!(stacked.unwrap().from, Mode::Move);

        let t = world.run_until(&mut behavior, Mode::Move, 2000);
        assert_eq!(t.from, Mode::Stack);

        // Free to turn back onto the target heading
        let mut transitions = 0;
        let deadline = world.now + 10_000;
        while world.now < deadline {
            if world.step(&mut behavior).transition.is_some() {
                transitions += 1;
            }
        }
        assert_eq!(transitions, 0, "left MOVE for {}", behavior.mode());
        assert!(fabsf(heading_error(200.0, behavior.heading())) <= 6.0);
    }

    #[test]
    fn test_slope_triggers_climb_and_resumes() {
        let mut behavior = Behavior::new(test_params());
        let mut world = World::new(200.0);
        world.object_bearing = 20.0;
        started(&mut world, &mut behavior);
        world.run_until(&mut behavior, Mode::Search, 5000);

        let tilt = 20.0 * core::f32::consts::PI / 180.0;
        world.accel = Vector3::new(9.81 * sinf(tilt), 0.0, 9.81 * cosf(tilt));
        let t = world.run_until(&mut behavior, Mode::Climb, 1000);
        assert_eq!(t.from, Mode::Search);
        assert_eq!(behavior.state().climb_phase(), 0);
        assert_eq!(behavior.state().resume_mode(), Mode::Search);

        world.accel = Vector3::new(0.0, 0.0, 9.81);
        let t = world.run_until(&mut behavior, Mode::Search, 20_000);
        assert_eq!(t.from, Mode::Climb);
    }

    #[test]
    fn test_moving_object_returns_to_search() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::CheckStatic, 0);

        let at = |cm: f32| SensorFrame {
            echo_us: Some(echo_for(cm)),
            ..frame_facing(0.0)
        };
        behavior.tick(0, &at(30.0));
        behavior.tick(100, &at(30.0));
        let out = behavior.tick(200, &at(20.0));
        assert_eq!(out.transition.map(|t| t.to), Some(Mode::Search));
    }

    #[test]
    fn test_moving_object_not_rechecked_immediately() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::Search, 0);
        behavior.state.transition(Mode::CheckStatic, 0);
        let at = |cm: f32| SensorFrame {
            echo_us: Some(echo_for(cm)),
            ..frame_facing(90.0)
        };
        behavior.tick(0, &at(30.0));
        behavior.tick(100, &at(30.0));
        let t = behavior.tick(200, &at(20.0)).transition.unwrap();
        assert_eq!(t.to, Mode::Search);

        // Still in the beam while the search rotation carries on
        let turning = |now: u64| SensorFrame {
            echo_us: Some(echo_for(25.0)),
            ..frame_facing(90.0 + (now - 200) as f32 * 0.2)
        };
        let holdoff = u64::from(behavior.params().behavior.redetect_holdoff_ms);
        let mut now = 200;
        while now + DT < 200 + holdoff {
            now += DT;
            assert!(behavior.tick(now, &turning(now)).transition.is_none(), "at {now}");
        }
        now += DT;
        let t = behavior.tick(now, &turning(now)).transition.unwrap();
        assert_eq!((t.from, t.to), (Mode::Search, Mode::CheckStatic));
    }

    #[test]
    fn test_search_ignores_goal_direction_after_delivery() {
        let mut behavior = Behavior::new(test_params());
        behavior.state.transition(Mode::Deposit, 0);
        behavior.state.transition(Mode::Search, 10);

        let toward_goal = SensorFrame {
            echo_us: Some(echo_for(20.0)),
            ..frame_facing(200.0)
        };
        let out = behavior.tick(20, &toward_goal);
        assert!(out.transition.is_none());

        let elsewhere = SensorFrame {
            echo_us: Some(echo_for(20.0)),
            ..frame_facing(20.0)
        };
        let mut now = 20;
        let mut found = None;
        while now < 500 && found.is_none() {
            now += DT;
            found = behavior.tick(now, &elsewhere).transition;
        }
        assert_eq!(found.map(|t| t.to), Some(Mode::CheckStatic));
    }

    #[test]
    fn test_calibration_setters_apply() {
        let mut behavior = Behavior::new(test_params());
        behavior.set_color_calibration(ColorCalibration {
            min: [0, 0, 0],
            max: [100, 100, 100],
        });
        let frame = SensorFrame {
            rgb: RgbSample::new(100, 100, 100),
            ..SensorFrame::default()
        };
        behavior.tick(0, &frame);
        assert_eq!(behavior.color(), ColorClass::White);
    }
}
