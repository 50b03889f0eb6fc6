//! Rent ratio grid

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest ratio grid a run will enumerate
pub const MAX_RATIOS: usize = 10_000;

/// Inclusive grid of candidate rent ratios
///
/// Ratios are rebuilt from an integer index rather than by repeated
/// addition, so the count is always round((max − min)/step) + 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl RatioRange {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, ConfigError> {
        let range = Self { min, max, step };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [("min_ratio", self.min), ("max_ratio", self.max), ("ratio_step", self.step)];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if self.step <= 0.0 {
            return Err(ConfigError::NonPositive { field: "ratio_step", value: self.step });
        }
        if self.max < self.min {
            return Err(ConfigError::InvalidRatioRange { min: self.min, max: self.max });
        }
        let count = ((self.max - self.min) / self.step).round() + 1.0;
        if !count.is_finite() || count > MAX_RATIOS as f64 {
            return Err(ConfigError::TooManyRatios { count, max: MAX_RATIOS });
        }
        Ok(())
    }

    /// Number of grid points; only meaningful once `validate` has passed
    pub fn count(&self) -> usize {
        ((self.max - self.min) / self.step).round() as usize + 1
    }

    /// Ratio at position `index`; the last index is snapped onto `max`
    /// when the grid lands on it
    pub fn ratio_at(&self, index: usize) -> f64 {
        let value = self.min + index as f64 * self.step;
        if index + 1 == self.count() && (value - self.max).abs() <= 1e-9 * self.step {
            self.max
        } else {
            value
        }
    }

    pub fn ratios(&self) -> Vec<f64> {
        (0..self.count()).map(|i| self.ratio_at(i)).collect()
    }
}
