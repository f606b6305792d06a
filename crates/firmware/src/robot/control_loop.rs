//! Control loop
//!
//! Wires the platform to the behavior state machine, one cycle per `tick`:
//!
//! - Read every sensor into a `SensorFrame` (button reduced to press edges)
//! - Run `Behavior::tick` with the current time
//! - Write the resulting command to the motors
//! - Log mode transitions and throttled status lines
//!
//! The loop is time-source agnostic: `tasks::run` drives it from an embassy
//! ticker on target, tests and the simulator call `tick` directly.

use zumo_cup_core::behavior::{Behavior, SensorFrame, TickOutput};
use zumo_cup_core::error::CalibrationError;
use zumo_cup_core::heading::CompassCalibration;
use zumo_cup_core::motor::MotorDriver;
use zumo_cup_core::parameters::{ParameterStore, RobotParams};
use zumo_cup_core::traits::{
    Accelerometer, Button, ColorSensor, Magnetometer, RangeSensor, RobotPlatform, TimeSource,
};

use super::button::ButtonEdge;
use super::calibration::{CalibrationConfig, CalibrationReport, Calibrator};
use super::status::StatusReporter;

pub struct ControlLoop<P: RobotPlatform, T: TimeSource> {
    platform: P,
    time: T,
    behavior: Behavior,
    button: ButtonEdge,
    status: StatusReporter,
}

impl<P: RobotPlatform, T: TimeSource> ControlLoop<P, T> {
    pub fn new(platform: P, time: T, behavior: Behavior) -> Self {
        let status = StatusReporter::new(behavior.params().behavior.status_interval_ms);
        Self {
            platform,
            time,
            behavior,
            button: ButtonEdge::new(),
            status,
        }
    }

    /// Build the behavior from a parameter store, falling back to defaults
    /// when the stored values are inconsistent.
    pub fn from_store(platform: P, time: T, store: &ParameterStore) -> Self {
        let params = RobotParams::from_store(store);
        let params = if params.is_valid() {
            params
        } else {
            crate::log_warn!("Inconsistent parameters, using defaults");
            RobotParams::default()
        };
        Self::new(platform, time, Behavior::new(params))
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Run the blocking calibration routines and install the results.
    pub fn calibrate(&mut self, config: CalibrationConfig) -> CalibrationReport {
        let report = Calibrator::new(&mut self.platform, config).run_all();
        let _applied = report.apply(&mut self.behavior);
        crate::log_info!("Calibration applied ({} of 3)", _applied);
        report
    }

    /// Run only the compass routine and install the result on success.
    pub fn calibrate_compass(
        &mut self,
        config: CalibrationConfig,
    ) -> Result<CompassCalibration, CalibrationError> {
        let calibration = Calibrator::new(&mut self.platform, config).compass()?;
        self.behavior.set_compass_calibration(calibration);
        crate::log_info!("Compass calibration applied");
        Ok(calibration)
    }

    fn read_frame(&mut self) -> SensorFrame {
        let pressed = self.platform.button().is_pressed();
        SensorFrame {
            mag: self.platform.magnetometer().read_mag(),
            rgb: self.platform.color_sensor().read_rgb(),
            echo_us: self.platform.range_sensor().read_echo_us(),
            accel: self.platform.accelerometer().read_accel(),
            button: self.button.update(pressed),
        }
    }

    /// Execute one control cycle.
    pub fn tick(&mut self) -> TickOutput {
        let now_ms = self.time.now_ms();
        let frame = self.read_frame();

        let output = self.behavior.tick(now_ms, &frame);
        self.platform.motors().set_speeds(output.command);

        if let Some(_transition) = output.transition {
            crate::log_info!(
                "Mode transition: {} -> {}",
                _transition.from.name(),
                _transition.to.name()
            );
        }
        self.status
            .update(now_ms, output.transition.is_some(), &self.behavior);

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use zumo_cup_core::behavior::Mode;
    use zumo_cup_core::motor::MotorCommand;
    use zumo_cup_core::sensors::RgbSample;
    use zumo_cup_core::traits::MockTime;

    fn control_loop() -> ControlLoop<MockPlatform, MockTime> {
        ControlLoop::new(
            MockPlatform::new(),
            MockTime::new(),
            Behavior::new(RobotParams::default()),
        )
    }

    fn start(control: &mut ControlLoop<MockPlatform, MockTime>) {
        control.tick();
        control.platform_mut().button.push(true);
        control.time().advance(20);
        let output = control.tick();
        assert_eq!(output.transition.map(|t| t.to), Some(Mode::Direction));
    }

    #[test]
    fn test_idle_until_button() {
        let mut control = control_loop();
        for _ in 0..10 {
            let output = control.tick();
            assert_eq!(output.command, MotorCommand::STOP);
            control.time().advance(20);
        }
        assert_eq!(control.behavior().mode(), Mode::Init);
        assert_eq!(control.platform().motors.writes(), 10);
    }

    #[test]
    fn test_button_held_at_boot_does_not_start() {
        let mut control = control_loop();
        control.platform_mut().button.set_default(true);
        for _ in 0..5 {
            control.tick();
            control.time().advance(20);
        }
        assert_eq!(control.behavior().mode(), Mode::Init);
    }

    #[test]
    fn test_start_writes_heading_command() {
        let mut control = control_loop();
        // Mock heading 0 with -7.5 declination: off target by 7.5 degrees
        start(&mut control);
        let command = control.platform().motors.command();
        assert!(!command.is_stopped());
        assert_eq!(command.left, -command.right);
    }

    #[test]
    fn test_transition_forces_status_line() {
        let mut control = control_loop();
        start(&mut control);
        assert_eq!(control.status().reports(), 2);
        assert!(control.status().last_line().starts_with("mode=DIRECTION"));
    }

    #[test]
    fn test_status_is_throttled() {
        let mut control = control_loop();
        control.tick();
        for _ in 0..40 {
            control.time().advance(20);
            control.tick();
        }
        // t = 0 and t = 800 ms: only the first report so far
        assert_eq!(control.status().reports(), 1);
        for _ in 0..10 {
            control.time().advance(20);
            control.tick();
        }
        assert_eq!(control.status().reports(), 2);
    }

    #[test]
    fn test_black_floor_reverses_motors() {
        let mut control = control_loop();
        start(&mut control);
        // Force the search state through the behavior's normal path
        for _ in 0..300 {
            control.time().advance(20);
            control.tick();
            if control.behavior().mode() == Mode::Search {
                break;
            }
        }
        assert_eq!(control.behavior().mode(), Mode::Search);

        control.platform_mut().color.push(RgbSample::new(60, 52, 62));
        control.time().advance(20);
        let output = control.tick();
        assert_eq!(output.transition.map(|t| t.to), Some(Mode::Avoid));
        assert_eq!(
            control.platform().motors.command(),
            MotorCommand::straight(-140)
        );
    }

    #[test]
    fn test_calibrate_installs_results() {
        let mut control = control_loop();
        for _ in 0..3 {
            control.platform_mut().button.push(false);
            control.platform_mut().button.push(true);
        }
        let report = control.calibrate(CalibrationConfig::default());
        assert!(report.is_complete());
        assert!(control.platform().elapsed_ms() > 0);
    }

    #[test]
    fn test_calibrate_compass_corrects_heading() {
        let mut control = control_loop();
        control.platform_mut().mag.hard_iron = nalgebra::Vector2::new(0.8, -0.4);
        control.platform_mut().button.push(false);
        control.platform_mut().button.push(true);

        let calibration = control
            .calibrate_compass(CalibrationConfig::default())
            .unwrap();
        assert!((calibration.offset.x - 0.8).abs() < 0.05);
        assert_eq!(control.behavior().mode(), Mode::Init);
        assert!(control.platform().motors.command().is_stopped());
    }

    #[test]
    fn test_calibrate_compass_timeout_keeps_defaults() {
        let mut control = control_loop();
        let config = CalibrationConfig {
            button_timeout_ms: Some(100),
            ..CalibrationConfig::default()
        };
        assert_eq!(
            control.calibrate_compass(config),
            Err(CalibrationError::Cancelled)
        );
    }

    #[test]
    fn test_from_store_uses_stored_values() {
        let mut store = ParameterStore::new();
        RobotParams::register_defaults(&mut store).unwrap();
        let control = ControlLoop::from_store(MockPlatform::new(), MockTime::new(), &store);
        assert_eq!(*control.behavior().params(), RobotParams::default());
    }
}
