//! Monte Carlo rent-versus-buy scenarios
//!
//! Each trial simulates one CIR rate path and compares mortgaging against
//! renting on it. Per-ratio results are reduced into probabilities and mean
//! cost differences.

mod runner;
mod statistics;

pub use runner::{run, BatchProgress, CancellationToken, ScenarioRunner};
pub use statistics::{
    Accumulator, AggregateStatistics, RatioStatistics, RunWarning, SimulationReport,
};
