//! Rent vs Buy - CIR rate modeling and Monte Carlo housing cost comparison
//!
//! This library provides:
//! - CIR parameter calibration (regression seed + exact maximum likelihood)
//! - Euler-Maruyama simulation of monthly mortgage rate paths
//! - Fixed and variable rate mortgage payments and amortization schedules
//! - Per-path comparison of mortgaging against renting and investing
//! - Parallel, reproducible Monte Carlo aggregation over many paths

pub mod calibration;
pub mod comparison;
pub mod config;
pub mod error;
pub mod history;
pub mod mortgage;
pub mod scenario;
pub mod simulation;

// Re-export commonly used types
pub use calibration::{calibrate, Calibration, CalibrationConfig, CalibrationWarning};
pub use comparison::{compare, ComparisonInputs, ComparisonResult, RatioRange};
pub use config::SimulationConfig;
pub use error::{CalibrationError, ConfigError, DataError, Error, Result, SimulationError};
pub use history::{load_parameters, load_rate_history, RateHistory, RateUnits};
pub use mortgage::{payment, payment_broadcast, variable_payment};
pub use scenario::{AggregateStatistics, CancellationToken, ScenarioRunner, SimulationReport};
pub use simulation::{simulate, CirParameters, SimulationRng, Trajectory};
