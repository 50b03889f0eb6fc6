//! Closed-form regression seed for the CIR parameters
//!
//! Discretizing dr = alpha(theta − r)dt + sigma√r dW with step dt and
//! dividing by √r[t−1] gives
//!
//!   r[t]/√r[t−1] = a·√r[t−1] + b/√r[t−1] + noise
//!
//! with a = 1 − alpha·dt and b = alpha·theta·dt.

use crate::error::CalibrationError;
use crate::simulation::CirParameters;

/// Minimum series length: two regressors plus at least one residual dof
pub const MIN_OBSERVATIONS: usize = 4;

/// Regression estimate before likelihood refinement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionEstimate {
    /// Unconstrained estimates; may be non-positive for non-mean-reverting data
    pub alpha: f64,
    pub theta: f64,
    pub sigma: f64,
    /// Transitions used in the fit
    pub transitions: usize,
    /// Transitions dropped because the starting rate was not positive
    pub skipped: usize,
}

impl RegressionEstimate {
    /// Parameters when all three are strictly positive
    pub fn parameters(&self) -> Option<CirParameters> {
        CirParameters::new(self.alpha, self.theta, self.sigma).ok()
    }
}

/// Ordinary least squares on the discretized CIR equation.
///
/// Transitions out of a non-positive rate are skipped since 1/√r is
/// undefined there.
pub fn regression_seed(rates: &[f64], dt: f64) -> Result<RegressionEstimate, CalibrationError> {
    // Normal equation sums for columns x1 = √x, x2 = 1/√x
    let mut s11 = 0.0; // Σ x
    let mut s12 = 0.0; // Σ 1
    let mut s22 = 0.0; // Σ 1/x
    let mut s1y = 0.0;
    let mut s2y = 0.0;
    let mut pairs = Vec::with_capacity(rates.len().saturating_sub(1));
    let mut skipped = 0usize;

    for window in rates.windows(2) {
        let (x, next) = (window[0], window[1]);
        if !(x > 0.0) || !x.is_finite() || !next.is_finite() {
            skipped += 1;
            continue;
        }
        let root = x.sqrt();
        let y = next / root;
        s11 += x;
        s12 += 1.0;
        s22 += 1.0 / x;
        s1y += y * root;
        s2y += y / root;
        pairs.push((root, y));
    }

    let transitions = pairs.len();
    if transitions + 1 < MIN_OBSERVATIONS {
        return Err(CalibrationError::InsufficientData {
            required: MIN_OBSERVATIONS,
            provided: transitions + 1,
        });
    }

    let determinant = s11 * s22 - s12 * s12;
    if determinant.abs() <= 1e-12 * (s11 * s22).abs() {
        return Err(CalibrationError::DegenerateRegression { determinant });
    }

    let a = (s22 * s1y - s12 * s2y) / determinant;
    let b = (s11 * s2y - s12 * s1y) / determinant;

    let rss: f64 = pairs
        .iter()
        .map(|&(root, y)| {
            let residual = y - a * root - b / root;
            residual * residual
        })
        .sum();

    let alpha = (1.0 - a) / dt;
    let theta = b / (1.0 - a);
    let sigma = (rss / (transitions - 2) as f64 / dt).sqrt();

    Ok(RegressionEstimate { alpha, theta, sigma, transitions, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{simulate, SimulationRng};

    #[test]
    fn test_recovers_parameters_from_noiseless_path() {
        // Deterministic mean reversion: a and b are identified exactly
        let (alpha, theta) = (0.1, 0.05);
        let mut rates = vec![0.02];
        for _ in 0..200 {
            let r = *rates.last().unwrap();
            rates.push(r + alpha * (theta - r));
        }

        let estimate = regression_seed(&rates, 1.0).unwrap();
        assert!((estimate.alpha - alpha).abs() < 1e-4, "alpha {}", estimate.alpha);
        assert!((estimate.theta - theta).abs() < 1e-4, "theta {}", estimate.theta);
        assert!(estimate.sigma < 1e-5);
    }

    #[test]
    fn test_simulated_path_seed_is_close() {
        let truth = CirParameters::new(0.08, 0.05, 0.01).unwrap();
        let path = simulate(&truth, 4_000, 1.0, &mut SimulationRng::from_seed(11)).unwrap();
        let estimate = regression_seed(&path, 1.0).unwrap();

        assert_eq!(estimate.transitions, 3_999);
        assert!((estimate.theta - 0.05).abs() < 0.01, "theta {}", estimate.theta);
        assert!((estimate.sigma - 0.01).abs() < 0.001, "sigma {}", estimate.sigma);
        assert!(estimate.parameters().is_some());
    }

    #[test]
    fn test_skips_zero_rates() {
        let rates = [0.05, 0.0, 0.04, 0.045, 0.05, 0.048, 0.047, 0.049];
        let estimate = regression_seed(&rates, 1.0).unwrap();
        assert_eq!(estimate.skipped, 1);
        assert_eq!(estimate.transitions, 6);
    }

    #[test]
    fn test_rejects_short_and_constant_series() {
        assert_eq!(
            regression_seed(&[0.05, 0.04], 1.0).unwrap_err(),
            CalibrationError::InsufficientData { required: 4, provided: 2 }
        );
        assert!(matches!(
            regression_seed(&[0.05; 20], 1.0).unwrap_err(),
            CalibrationError::DegenerateRegression { .. }
        ));
    }
}
