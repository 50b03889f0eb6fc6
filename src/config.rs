//! Run configuration
//!
//! Every field has a default, so a JSON file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::comparison::{ComparisonInputs, RatioRange};
use crate::error::{ConfigError, DataError};
use crate::mortgage::{term_months, MAX_TERM_YEARS};

/// Full configuration for a Monte Carlo rent-versus-buy run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Property price
    #[serde(default = "default_principal")]
    pub principal: f64,

    /// Mortgage term in years
    #[serde(default = "default_term_years")]
    pub term_years: u32,

    /// Annual return on money the renter invests (e.g. 0.06 for 6%)
    #[serde(default = "default_investment_appreciation")]
    pub investment_appreciation: f64,

    /// Annual property price growth
    #[serde(default = "default_property_appreciation")]
    pub property_appreciation: f64,

    /// Months between rent resets
    #[serde(default = "default_lease_term_months")]
    pub lease_term_months: u32,

    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,

    #[serde(default = "default_max_ratio")]
    pub max_ratio: f64,

    #[serde(default = "default_ratio_step")]
    pub ratio_step: f64,

    /// Number of simulated rate paths
    #[serde(default = "default_num_trajectories")]
    pub num_trajectories: usize,

    /// Points per simulated path; must cover the mortgage term
    #[serde(default = "default_num_steps")]
    pub num_steps: usize,

    /// Simulation time step in months
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Base seed; drawn from entropy when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Fraction of excluded trials above which a warning is raised
    #[serde(default = "default_max_exclusion_rate")]
    pub max_exclusion_rate: f64,

    /// Trials per parallel batch; cancellation is checked between batches
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_principal() -> f64 {
    700_000.0
}

fn default_term_years() -> u32 {
    25
}

fn default_investment_appreciation() -> f64 {
    0.06
}

fn default_property_appreciation() -> f64 {
    0.03
}

fn default_lease_term_months() -> u32 {
    12
}

fn default_min_ratio() -> f64 {
    0.6
}

fn default_max_ratio() -> f64 {
    0.9
}

fn default_ratio_step() -> f64 {
    0.05
}

fn default_num_trajectories() -> usize {
    10_000
}

fn default_num_steps() -> usize {
    300
}

fn default_dt() -> f64 {
    1.0
}

fn default_max_exclusion_rate() -> f64 {
    0.05
}

fn default_batch_size() -> usize {
    1_024
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            principal: default_principal(),
            term_years: default_term_years(),
            investment_appreciation: default_investment_appreciation(),
            property_appreciation: default_property_appreciation(),
            lease_term_months: default_lease_term_months(),
            min_ratio: default_min_ratio(),
            max_ratio: default_max_ratio(),
            ratio_step: default_ratio_step(),
            num_trajectories: default_num_trajectories(),
            num_steps: default_num_steps(),
            dt: default_dt(),
            rng_seed: None,
            max_exclusion_rate: default_max_exclusion_rate(),
            batch_size: default_batch_size(),
        }
    }
}

impl SimulationConfig {
    /// Load from a JSON file, filling omitted fields with defaults
    pub fn from_json_path(path: &Path) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject anything that would make the run meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("principal", self.principal),
            ("investment_appreciation", self.investment_appreciation),
            ("property_appreciation", self.property_appreciation),
            ("dt", self.dt),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        let positive = [
            ("principal", self.principal),
            ("term_years", self.term_years as f64),
            ("lease_term_months", self.lease_term_months as f64),
            ("num_trajectories", self.num_trajectories as f64),
            ("num_steps", self.num_steps as f64),
            ("dt", self.dt),
            ("batch_size", self.batch_size as f64),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.term_years > MAX_TERM_YEARS {
            return Err(ConfigError::OutOfRange {
                field: "term_years",
                value: self.term_years as f64,
                max: MAX_TERM_YEARS as f64,
            });
        }

        self.ratio_range().validate()?;

        let months = self.term_months();
        if self.num_steps < months {
            return Err(ConfigError::TrajectoryTooShort { steps: self.num_steps, months });
        }

        if !(0.0..=1.0).contains(&self.max_exclusion_rate) {
            return Err(ConfigError::InvalidExclusionRate(self.max_exclusion_rate));
        }

        Ok(())
    }

    pub fn term_months(&self) -> usize {
        term_months(self.term_years) as usize
    }

    pub fn ratio_range(&self) -> RatioRange {
        RatioRange { min: self.min_ratio, max: self.max_ratio, step: self.ratio_step }
    }

    pub fn comparison_inputs(&self) -> ComparisonInputs {
        ComparisonInputs {
            principal: self.principal,
            term_years: self.term_years,
            investment_appreciation: self.investment_appreciation,
            property_appreciation: self.property_appreciation,
            lease_term_months: self.lease_term_months,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.term_months(), 300);
        assert_eq!(config.ratio_range().count(), 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"principal": 500000, "rng_seed": 7}"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.principal, 500_000.0);
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.term_years, 25);
        assert_eq!(config.num_trajectories, 10_000);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let config = SimulationConfig { principal: -1.0, ..Default::default() };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::NonPositive { field: "principal", value: -1.0 }
        );

        let config = SimulationConfig { max_ratio: 0.5, ..Default::default() };
        assert!(matches!(config.validate().unwrap_err(), ConfigError::InvalidRatioRange { .. }));

        let config = SimulationConfig { ratio_step: 0.0, ..Default::default() };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::NonPositive { field: "ratio_step", .. }
        ));

        let config = SimulationConfig { num_steps: 120, ..Default::default() };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::TrajectoryTooShort { steps: 120, months: 300 }
        );

        let config = SimulationConfig { term_years: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = SimulationConfig { max_exclusion_rate: 1.5, ..Default::default() };
        assert_eq!(config.validate().unwrap_err(), ConfigError::InvalidExclusionRate(1.5));
    }

    #[test]
    fn test_rejects_values_that_would_overflow() {
        let config = SimulationConfig { term_years: 400_000_000, ..Default::default() };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::OutOfRange { field: "term_years", value: 400_000_000.0, max: 100.0 }
        );
        assert_eq!(config.term_months(), u32::MAX as usize);

        let config = SimulationConfig {
            min_ratio: 0.0,
            max_ratio: 1e6,
            ratio_step: 1e-12,
            ..Default::default()
        };
        assert!(matches!(config.validate().unwrap_err(), ConfigError::TooManyRatios { .. }));

        let config = SimulationConfig {
            term_years: MAX_TERM_YEARS,
            num_steps: 1_200,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
