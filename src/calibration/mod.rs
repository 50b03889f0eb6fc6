//! CIR parameter calibration from a historical rate series
//!
//! Runs once, offline, before any simulation:
//! 1. **Regression seed**: OLS on the discretized CIR equation
//! 2. **Maximum likelihood**: Nelder-Mead on the exact transition density,
//!    started from the regression seed
//!
//! The optimizer searches over ln(alpha), ln(theta), ln(sigma) inside a box,
//! so every trial point is strictly positive. Points where the likelihood is
//! not finite are rejected by scoring them +inf.
//!
//! # Example
//!
//! ```rust,ignore
//! let calibration = calibrate(&history.rates(), &CalibrationConfig::default())?;
//! println!("alpha = {:.4}", calibration.parameters.alpha);
//! ```

mod bessel;
mod likelihood;
mod optimizer;
mod regression;

pub use bessel::ln_bessel_i;
pub use likelihood::{log_likelihood, scored_transitions};
pub use optimizer::{nelder_mead, BoxConstraints, NelderMeadOptions, OptimisationResult};
pub use regression::{regression_seed, RegressionEstimate, MIN_OBSERVATIONS};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;
use crate::simulation::CirParameters;

/// Calibration settings
#[derive(Debug, Clone)]
pub struct CalibrationConfig {
    /// Time step between observations (1 = one month for monthly data)
    pub dt: f64,
    /// Parameter floor used when the regression seed is not positive
    pub min_parameter: f64,
    /// Parameter ceiling for the search box
    pub max_parameter: f64,
    pub optimizer: NelderMeadOptions,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            min_parameter: 1e-8,
            max_parameter: 10.0,
            optimizer: NelderMeadOptions::default(),
        }
    }
}

/// Non-fatal findings surfaced alongside the calibrated parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalibrationWarning {
    /// 2·alpha·theta ≤ sigma²; simulated paths will hit the reflection more often
    FellerViolated { alpha: f64, theta: f64, sigma: f64 },
    /// Observations at or below zero were left out of the fit
    SkippedObservations { count: usize },
    /// Regression seed had a non-positive component and was floored
    SeedAdjusted { alpha: f64, theta: f64, sigma: f64 },
}

impl std::fmt::Display for CalibrationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationWarning::FellerViolated { alpha, theta, sigma } => write!(
                f,
                "Feller condition violated: 2*{alpha:.6}*{theta:.6} <= {sigma:.6}^2"
            ),
            CalibrationWarning::SkippedObservations { count } => {
                write!(f, "{count} transitions with non-positive rates were skipped")
            }
            CalibrationWarning::SeedAdjusted { alpha, theta, sigma } => write!(
                f,
                "Regression seed ({alpha:.6}, {theta:.6}, {sigma:.6}) was not positive \
                 and was floored"
            ),
        }
    }
}

/// Result of a calibration run
#[derive(Debug, Clone)]
pub struct Calibration {
    pub parameters: CirParameters,
    pub seed: RegressionEstimate,
    pub log_likelihood: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub warnings: Vec<CalibrationWarning>,
}

/// Calibrate CIR parameters to a chronological rate series
pub fn calibrate(
    rates: &[f64],
    config: &CalibrationConfig,
) -> Result<Calibration, CalibrationError> {
    if !(config.dt > 0.0) {
        let message = format!("dt must be positive, got {}", config.dt);
        return Err(CalibrationError::InvalidSetup(message));
    }
    let mut warnings = Vec::new();

    let seed = regression_seed(rates, config.dt)?;
    info!(
        "Regression seed: alpha={:.6} theta={:.6} sigma={:.6} ({} transitions)",
        seed.alpha, seed.theta, seed.sigma, seed.transitions
    );

    let skipped = rates.len().saturating_sub(1) - scored_transitions(rates);
    if skipped > 0 {
        warn!("Skipping {} transitions with non-positive rates", skipped);
        warnings.push(CalibrationWarning::SkippedObservations { count: skipped });
    }

    let floor = config.min_parameter;
    let start = [seed.alpha, seed.theta, seed.sigma];
    if start.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
        warn!("Regression seed is not positive; flooring at {}", floor);
        warnings.push(CalibrationWarning::SeedAdjusted {
            alpha: seed.alpha,
            theta: seed.theta,
            sigma: seed.sigma,
        });
    }
    let initial: Vec<f64> = start
        .iter()
        .map(|v| if v.is_finite() { v.clamp(floor, config.max_parameter) } else { floor })
        .map(f64::ln)
        .collect();

    let bounds = BoxConstraints::new(vec![floor.ln(); 3], vec![config.max_parameter.ln(); 3])?;

    let objective = |x: &[f64]| {
        let params = CirParameters { alpha: x[0].exp(), theta: x[1].exp(), sigma: x[2].exp() };
        let value = log_likelihood(&params, rates, config.dt);
        if value.is_finite() {
            -value
        } else {
            f64::INFINITY
        }
    };

    let result = nelder_mead(&initial, &bounds, config.optimizer, objective)?;
    debug!(
        "Nelder-Mead finished after {} iterations ({} evaluations), objective {}",
        result.iterations, result.evaluations, result.objective
    );

    let parameters = CirParameters {
        alpha: result.x[0].exp(),
        theta: result.x[1].exp(),
        sigma: result.x[2].exp(),
    };

    if !result.objective.is_finite() {
        return Err(CalibrationError::NonFiniteLikelihood {
            alpha: parameters.alpha,
            theta: parameters.theta,
            sigma: parameters.sigma,
        });
    }
    if !result.converged {
        return Err(CalibrationError::NotConverged { iterations: result.iterations });
    }

    if !parameters.feller_satisfied() {
        warn!(
            "Calibrated parameters violate the Feller condition \
             (2*alpha*theta={:.3e}, sigma^2={:.3e})",
            2.0 * parameters.alpha * parameters.theta,
            parameters.sigma * parameters.sigma
        );
        warnings.push(CalibrationWarning::FellerViolated {
            alpha: parameters.alpha,
            theta: parameters.theta,
            sigma: parameters.sigma,
        });
    }

    info!(
        "Calibrated CIR parameters: alpha={:.6} theta={:.6} sigma={:.6}",
        parameters.alpha, parameters.theta, parameters.sigma
    );

    Ok(Calibration {
        parameters,
        seed,
        log_likelihood: -result.objective,
        iterations: result.iterations,
        evaluations: result.evaluations,
        warnings,
    })
}
