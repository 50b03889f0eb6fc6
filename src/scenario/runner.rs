//! Monte Carlo runner: many independent (simulate → compare) trials
//!
//! Trials run in parallel batches. Each batch collects its results in trial
//! order and folds them into the accumulator sequentially, so a fixed seed
//! gives bit-identical statistics regardless of thread count or batch size.

use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::statistics::{Accumulator, RunWarning, SimulationReport};
use crate::calibration::CalibrationWarning;
use crate::comparison::{compare, ComparisonInputs, ComparisonResult, RatioRange};
use crate::config::SimulationConfig;
use crate::error::{Error, Result, SimulationError};
use crate::simulation::{simulate, CirParameters, SimulationRng};

type TrialOutcome = std::result::Result<ComparisonResult, SimulationError>;

/// Cooperative stop signal, checked between batches
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress reported after each batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchProgress {
    pub completed: usize,
    pub excluded: usize,
    pub total: usize,
}

/// Runs the rent-versus-buy Monte Carlo for one parameter set
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(config, calibration.parameters)
///     .with_calibration_warnings(calibration.warnings);
/// let report = runner.run()?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: SimulationConfig,
    params: CirParameters,
    calibration_warnings: Vec<CalibrationWarning>,
}

impl ScenarioRunner {
    pub fn new(config: SimulationConfig, params: CirParameters) -> Self {
        Self {
            config,
            params,
            calibration_warnings: Vec::new(),
        }
    }

    /// Carry calibration warnings through to the report
    pub fn with_calibration_warnings(mut self, warnings: Vec<CalibrationWarning>) -> Self {
        self.calibration_warnings = warnings;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn params(&self) -> &CirParameters {
        &self.params
    }

    /// Run every configured trial
    pub fn run(&self) -> Result<SimulationReport> {
        self.run_with(&CancellationToken::new(), |_| {})
    }

    /// Run until done or cancelled; `on_batch` is called after each batch
    pub fn run_with<F>(
        &self,
        token: &CancellationToken,
        mut on_batch: F,
    ) -> Result<SimulationReport>
    where
        F: FnMut(&BatchProgress),
    {
        self.config.validate()?;
        self.params.validate()?;

        let base_seed = self.config.rng_seed.unwrap_or_else(rand::random);
        let total = self.config.num_trajectories;
        let batch_size = self.config.batch_size;
        let inputs = self.config.comparison_inputs();
        let ratios = self.config.ratio_range();

        info!(
            "Running {} trials (seed {}, alpha={:.6} theta={:.6} sigma={:.6})",
            total, base_seed, self.params.alpha, self.params.theta, self.params.sigma
        );

        let mut accumulator = Accumulator::new(ratios.ratios());
        let mut cancelled = false;
        let mut next = 0usize;

        while next < total {
            if token.is_cancelled() {
                warn!("Run cancelled after {} of {} trials", next, total);
                cancelled = true;
                break;
            }

            let end = (next + batch_size).min(total);
            let outcomes: Vec<TrialOutcome> = (next..end)
                .into_par_iter()
                .map(|trial| self.run_trial_with(base_seed, trial as u64, &inputs, &ratios))
                .collect();

            for (offset, outcome) in outcomes.iter().enumerate() {
                match outcome {
                    Ok(result) => accumulator.add(result),
                    Err(e) => {
                        debug!("Trial {} excluded: {}", next + offset, e);
                        accumulator.exclude();
                    }
                }
            }
            next = end;

            let progress = BatchProgress {
                completed: accumulator.completed(),
                excluded: accumulator.excluded(),
                total,
            };
            debug!(
                "Completed {}/{} trials ({} excluded)",
                progress.completed, total, progress.excluded
            );
            on_batch(&progress);
        }

        self.summarize(accumulator, base_seed, cancelled)
    }

    /// Re-run a single trial exactly as the batch run would
    pub fn run_trial(&self, base_seed: u64, trial: u64) -> TrialOutcome {
        let inputs = self.config.comparison_inputs();
        let ratios = self.config.ratio_range();
        self.run_trial_with(base_seed, trial, &inputs, &ratios)
    }

    fn run_trial_with(
        &self,
        base_seed: u64,
        trial: u64,
        inputs: &ComparisonInputs,
        ratios: &RatioRange,
    ) -> TrialOutcome {
        let mut rng = SimulationRng::for_trial(base_seed, trial);
        let trajectory = simulate(&self.params, self.config.num_steps, self.config.dt, &mut rng)?;
        compare(inputs, &trajectory, ratios)
    }

    fn summarize(
        &self,
        accumulator: Accumulator,
        base_seed: u64,
        cancelled: bool,
    ) -> Result<SimulationReport> {
        let completed = accumulator.completed();
        let excluded = accumulator.excluded();

        let mut warnings: Vec<RunWarning> = self
            .calibration_warnings
            .iter()
            .cloned()
            .map(RunWarning::Calibration)
            .collect();

        let feller_flagged = self
            .calibration_warnings
            .iter()
            .any(|w| matches!(w, CalibrationWarning::FellerViolated { .. }));
        if !feller_flagged && !self.params.feller_satisfied() {
            warn!("Simulation parameters violate the Feller condition");
            warnings.push(RunWarning::Calibration(CalibrationWarning::FellerViolated {
                alpha: self.params.alpha,
                theta: self.params.theta,
                sigma: self.params.sigma,
            }));
        }

        if completed > 0 {
            let rate = excluded as f64 / completed as f64;
            if rate > self.config.max_exclusion_rate {
                warn!(
                    "{} of {} trials excluded ({:.2}%), above the {:.2}% threshold",
                    excluded,
                    completed,
                    rate * 100.0,
                    self.config.max_exclusion_rate * 100.0
                );
                warnings.push(RunWarning::HighExclusionRate {
                    excluded,
                    completed,
                    threshold: self.config.max_exclusion_rate,
                });
            }
        }

        let statistics = accumulator
            .finish()
            .ok_or(Error::NoValidTrials { completed, excluded })?;

        info!("Finished {} trials, {} excluded", completed, excluded);

        Ok(SimulationReport {
            statistics,
            trials_requested: self.config.num_trajectories,
            trials_completed: completed,
            excluded_trials: excluded,
            base_seed,
            cancelled,
            warnings,
        })
    }
}

/// Run `num_trials` trials with `config`, ignoring its own trial count
pub fn run(
    config: &SimulationConfig,
    params: CirParameters,
    num_trials: usize,
) -> Result<SimulationReport> {
    let config = SimulationConfig { num_trajectories: num_trials, ..config.clone() };
    ScenarioRunner::new(config, params).run()
}
