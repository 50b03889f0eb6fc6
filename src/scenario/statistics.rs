//! Per-ratio reduction of trial results

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::calibration::CalibrationWarning;
use crate::comparison::ComparisonResult;
use crate::error::{DataError, SimulationError};

/// Aggregate outcome for one rent ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioStatistics {
    pub ratio: f64,
    /// Share of valid trials where renting was cheaper
    pub favor_rent_probability: f64,
    /// Mean of (mortgage cost − rental net cost)
    pub mean_cost_difference: f64,
}

/// Statistics over all valid trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    pub valid_trials: usize,
    pub ratios: Vec<RatioStatistics>,
}

impl AggregateStatistics {
    pub fn get(&self, ratio: f64) -> Option<&RatioStatistics> {
        self.ratios.iter().find(|s| (s.ratio - ratio).abs() < 1e-12)
    }

    /// Smallest ratio at which renting wins in at most half the trials
    pub fn break_even_ratio(&self) -> Option<f64> {
        self.ratios
            .iter()
            .find(|s| s.favor_rent_probability <= 0.5)
            .map(|s| s.ratio)
    }

    /// Write `ratio,favor_rent_probability,mean_cost_difference` rows
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DataError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.ratios {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Running (count, sum) per ratio.
///
/// Merging is associative and commutative, so trials can be split across
/// workers in any partition. Summation order still affects the last bits of
/// the mean; callers wanting bit-identical output add trials in a fixed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    ratios: Vec<f64>,
    favor_counts: Vec<u64>,
    sums: Vec<f64>,
    valid: usize,
    excluded: usize,
}

impl Accumulator {
    pub fn new(ratios: Vec<f64>) -> Self {
        let n = ratios.len();
        Self {
            ratios,
            favor_counts: vec![0; n],
            sums: vec![0.0; n],
            valid: 0,
            excluded: 0,
        }
    }

    pub fn add(&mut self, result: &ComparisonResult) {
        for (i, &difference) in result.differences.iter().enumerate().take(self.ratios.len()) {
            if difference > 0.0 {
                self.favor_counts[i] += 1;
            }
            self.sums[i] += difference;
        }
        self.valid += 1;
    }

    /// Count a trial that failed and is left out of every denominator
    pub fn exclude(&mut self) {
        self.excluded += 1;
    }

    /// Combine two partial reductions over the same ratio grid
    pub fn merge(mut self, other: &Accumulator) -> Result<Self, SimulationError> {
        if self.ratios != other.ratios {
            return Err(SimulationError::RatioGridMismatch);
        }
        for i in 0..self.ratios.len() {
            self.favor_counts[i] += other.favor_counts[i];
            self.sums[i] += other.sums[i];
        }
        self.valid += other.valid;
        self.excluded += other.excluded;
        Ok(self)
    }

    pub fn valid(&self) -> usize {
        self.valid
    }

    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn completed(&self) -> usize {
        self.valid + self.excluded
    }

    /// Divide by the number of valid trials; None if there are none
    pub fn finish(&self) -> Option<AggregateStatistics> {
        if self.valid == 0 {
            return None;
        }
        let n = self.valid as f64;
        let ratios = self
            .ratios
            .iter()
            .enumerate()
            .map(|(i, &ratio)| RatioStatistics {
                ratio,
                favor_rent_probability: self.favor_counts[i] as f64 / n,
                mean_cost_difference: self.sums[i] / n,
            })
            .collect();
        Some(AggregateStatistics { valid_trials: self.valid, ratios })
    }
}

/// Warnings returned with a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunWarning {
    Calibration(CalibrationWarning),
    /// Excluded share of completed trials exceeded the configured threshold
    HighExclusionRate { excluded: usize, completed: usize, threshold: f64 },
}

impl std::fmt::Display for RunWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunWarning::Calibration(warning) => write!(f, "{warning}"),
            RunWarning::HighExclusionRate { excluded, completed, threshold } => write!(
                f,
                "{excluded} of {completed} trials excluded (threshold {:.1}%); \
                 parameters may be unstable",
                threshold * 100.0
            ),
        }
    }
}

/// Everything a caller gets back from a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub statistics: AggregateStatistics,
    pub trials_requested: usize,
    pub trials_completed: usize,
    pub excluded_trials: usize,
    pub base_seed: u64,
    pub cancelled: bool,
    pub warnings: Vec<RunWarning>,
}
