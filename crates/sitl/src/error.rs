/// Errors that can occur while loading or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Scenario parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Calibration failed: {0}")]
    Calibration(zumo_cup_core::error::CalibrationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zumo_cup_core::error::CalibrationError> for SimulatorError {
    fn from(err: zumo_cup_core::error::CalibrationError) -> Self {
        SimulatorError::Calibration(err)
    }
}
