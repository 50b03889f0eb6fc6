//! Error taxonomy for calibration, configuration, simulation and data loading

use thiserror::Error;

/// Calibration failures. Fatal: nothing downstream can run without parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Not enough usable transitions to fit the regression
    #[error("Insufficient data: need at least {required} positive observations, got {provided}")]
    InsufficientData { required: usize, provided: usize },

    /// Normal equations are singular (e.g. a constant series)
    #[error("Regression normal equations are singular (determinant {determinant})")]
    DegenerateRegression { determinant: f64 },

    /// Likelihood is non-finite everywhere the optimizer looked
    #[error("Log-likelihood is not finite at {alpha}, {theta}, {sigma}")]
    NonFiniteLikelihood { alpha: f64, theta: f64, sigma: f64 },

    /// Optimizer exhausted its iteration budget
    #[error("Likelihood maximization did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    /// Optimizer bounds or start vector are malformed
    #[error("Invalid optimizer setup: {0}")]
    InvalidSetup(String),
}

/// Invalid run configuration, rejected before any trial starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("max_ratio ({max}) is below min_ratio ({min})")]
    InvalidRatioRange { min: f64, max: f64 },

    #[error("Ratio grid would have {count} points, at most {max} allowed")]
    TooManyRatios { count: f64, max: usize },

    #[error("{field} must be at most {max}, got {value}")]
    OutOfRange { field: &'static str, value: f64, max: f64 },

    #[error("num_steps ({steps}) is shorter than the mortgage term ({months} months)")]
    TrajectoryTooShort { steps: usize, months: usize },

    #[error("max_exclusion_rate must lie in [0, 1], got {0}")]
    InvalidExclusionRate(f64),

    #[error("Invalid CIR parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Numerical failure inside a single trial. Recovered by the aggregator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Non-finite value in {stage} at index {index}")]
    NonFinite { stage: &'static str, index: usize },

    #[error("Trajectory has {len} steps but {required} months are needed")]
    TrajectoryTooShort { len: usize, required: usize },

    #[error("Sequence lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Cannot merge results over different ratio grids")]
    RatioGridMismatch,
}

/// Failures reading historical rates or parameter files.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date '{value}' on line {line}")]
    InvalidDate { value: String, line: u64 },

    #[error("Invalid rate '{value}' on line {line}")]
    InvalidRate { value: String, line: u64 },

    #[error("No usable observations in rate history")]
    Empty,
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("No valid trials: {excluded} of {completed} completed trials were excluded")]
    NoValidTrials { completed: usize, excluded: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ConfigError::TrajectoryTooShort { steps: 120, months: 300 };
        let msg = err.to_string();
        assert!(msg.contains("120") && msg.contains("300"));

        let wrapped: Error = CalibrationError::NotConverged { iterations: 42 }.into();
        assert!(wrapped.to_string().contains("42"));
    }
}
