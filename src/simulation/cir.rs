//! Cox-Ingersoll-Ross short rate model and its Euler-Maruyama simulation
//!
//! dr = alpha·(theta − r)·dt + sigma·√r·dW

use serde::{Deserialize, Serialize};

use super::rng::SimulationRng;
use crate::error::{ConfigError, SimulationError};

/// Calibrated CIR parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirParameters {
    /// Mean-reversion speed
    pub alpha: f64,
    /// Long-run mean level
    pub theta: f64,
    /// Volatility
    pub sigma: f64,
}

impl CirParameters {
    pub fn new(alpha: f64, theta: f64, sigma: f64) -> Result<Self, ConfigError> {
        let params = Self { alpha, theta, sigma };
        params.validate()?;
        Ok(params)
    }

    /// All three parameters must be finite and strictly positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("alpha", self.alpha), ("theta", self.theta), ("sigma", self.sigma)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// 2·alpha·theta > sigma²: the continuous process stays strictly positive
    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.alpha * self.theta > self.sigma * self.sigma
    }

    /// Stationary variance theta·sigma²/(2·alpha)
    pub fn stationary_variance(&self) -> f64 {
        self.theta * self.sigma * self.sigma / (2.0 * self.alpha)
    }
}

/// One simulated rate path. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    rates: Vec<f64>,
}

impl Trajectory {
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn into_rates(self) -> Vec<f64> {
        self.rates
    }
}

impl std::ops::Deref for Trajectory {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.rates
    }
}

/// Simulate `num_steps` points starting at theta.
///
/// The reflected step |r + drift + diffusion| keeps rates non-negative at the
/// cost of a small discretization bias.
///
/// The shock is scaled by √dt, not dt, so the step variance is sigma²·r·dt for
/// any `dt`; at the default `dt = 1` the two scalings coincide.
pub fn simulate(
    params: &CirParameters,
    num_steps: usize,
    dt: f64,
    rng: &mut SimulationRng,
) -> Result<Trajectory, SimulationError> {
    let mut rates = Vec::with_capacity(num_steps);
    if num_steps == 0 {
        return Ok(Trajectory { rates });
    }

    let sqrt_dt = dt.sqrt();
    let mut prev = params.theta;
    rates.push(prev);

    for t in 1..num_steps {
        let w = rng.gen_normal();
        let drift = params.alpha * (params.theta - prev) * dt;
        let diffusion = params.sigma * prev.sqrt() * sqrt_dt * w;
        let next = (prev + drift + diffusion).abs();

        if !next.is_finite() {
            return Err(SimulationError::NonFinite { stage: "rate simulation", index: t });
        }
        rates.push(next);
        prev = next;
    }

    Ok(Trajectory { rates })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> CirParameters {
        CirParameters::new(0.05, 0.04, 0.01).unwrap()
    }

    #[test]
    fn test_starts_at_theta_with_requested_length() {
        let mut rng = SimulationRng::from_seed(1);
        let path = simulate(&params(), 300, 1.0, &mut rng).unwrap();
        assert_eq!(path.len(), 300);
        assert_eq!(path[0], 0.04);
    }

    #[test]
    fn test_zero_and_single_step() {
        let mut rng = SimulationRng::from_seed(1);
        assert!(simulate(&params(), 0, 1.0, &mut rng).unwrap().is_empty());
        assert_eq!(simulate(&params(), 1, 1.0, &mut rng).unwrap().rates(), &[0.04]);
    }

    #[test]
    fn test_identical_seed_identical_path() {
        let a = simulate(&params(), 500, 1.0, &mut SimulationRng::from_seed(99)).unwrap();
        let b = simulate(&params(), 500, 1.0, &mut SimulationRng::from_seed(99)).unwrap();
        let c = simulate(&params(), 500, 1.0, &mut SimulationRng::from_seed(100)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_long_run_mean_near_theta() {
        let mut rng = SimulationRng::from_seed(5);
        let path = simulate(&params(), 20_000, 1.0, &mut rng).unwrap();
        let mean = path.iter().sum::<f64>() / path.len() as f64;
        assert!((mean - 0.04).abs() < 0.004, "mean {}", mean);
    }

    #[test]
    fn test_shock_scales_with_sqrt_dt() {
        // With alpha·dt tiny the drift vanishes and the one-step spread is sigma·√(r·dt)
        let params = CirParameters::new(1e-9, 0.04, 0.02).unwrap();
        let dt = 0.25;
        let n = 20_000;
        let mut rng = SimulationRng::from_seed(17);
        let steps: Vec<f64> = (0..n)
            .map(|_| simulate(&params, 2, dt, &mut rng).unwrap()[1] - 0.04)
            .collect();
        let sd = (steps.iter().map(|s| s * s).sum::<f64>() / n as f64).sqrt();
        let expected = 0.02 * (0.04f64 * dt).sqrt();
        assert!((sd - expected).abs() < 0.03 * expected, "sd {} vs {}", sd, expected);
    }

    #[test]
    fn test_feller_condition() {
        assert!(params().feller_satisfied());
        assert!(!CirParameters::new(0.01, 0.01, 0.1).unwrap().feller_satisfied());
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        assert_eq!(
            CirParameters::new(0.0, 0.05, 0.01).unwrap_err(),
            ConfigError::InvalidParameter { name: "alpha", value: 0.0 }
        );
        assert!(CirParameters::new(0.1, 0.05, f64::NAN).is_err());
    }

    proptest! {
        #[test]
        fn prop_trajectory_non_negative(
            alpha in 0.001f64..2.0,
            theta in 0.001f64..0.2,
            sigma in 0.001f64..1.0,
            steps in 1usize..400,
            seed in any::<u64>(),
        ) {
            let params = CirParameters::new(alpha, theta, sigma).unwrap();
            let path = simulate(&params, steps, 1.0, &mut SimulationRng::from_seed(seed)).unwrap();
            prop_assert_eq!(path.len(), steps);
            prop_assert!(path.iter().all(|&r| r >= 0.0));
        }
    }
}
