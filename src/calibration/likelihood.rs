//! Exact CIR transition log-likelihood
//!
//! Given r[t−1], c·r[t] is noncentral chi-squared. With
//!   c = 2α / (σ²(1 − e^{−α dt})),  q = 2αθ/σ² − 1,
//!   u = c·r[t−1]·e^{−α dt},         v = c·r[t],
//! the log density is ln c − u − v + (q/2)·ln(v/u) + ln I_q(2√(uv)).

use super::bessel::ln_bessel_i;
use crate::simulation::CirParameters;

/// Sum of transition log densities over consecutive positive observations.
///
/// Returns NaN or −inf when the parameters leave the valid domain; callers
/// decide how to treat those values.
pub fn log_likelihood(params: &CirParameters, rates: &[f64], dt: f64) -> f64 {
    let CirParameters { alpha, theta, sigma } = *params;
    if !(alpha > 0.0 && theta > 0.0 && sigma > 0.0) {
        return f64::NAN;
    }

    let decay = (-alpha * dt).exp();
    let c = 2.0 * alpha / (sigma * sigma * (1.0 - decay));
    let q = 2.0 * alpha * theta / (sigma * sigma) - 1.0;
    let ln_c = c.ln();

    rates
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| {
            let u = c * w[0] * decay;
            let v = c * w[1];
            let z = 2.0 * (u * v).sqrt();
            ln_c - u - v + 0.5 * q * (v / u).ln() + ln_bessel_i(q, z)
        })
        .sum()
}

/// Number of transitions the likelihood actually scores
pub fn scored_transitions(rates: &[f64]) -> usize {
    rates.windows(2).filter(|w| w[0] > 0.0 && w[1] > 0.0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{simulate, SimulationRng};

    #[test]
    fn test_density_integrates_to_one() {
        // Trapezoid integral of the one-step density over r[t]
        let params = CirParameters::new(0.3, 0.05, 0.05).unwrap();
        let r0 = 0.04;
        let (lo, hi, n) = (1e-6, 0.2, 20_000);
        let h = (hi - lo) / n as f64;
        let mut total = 0.0;
        for i in 0..=n {
            let r1 = lo + i as f64 * h;
            let weight = if i == 0 || i == n { 0.5 } else { 1.0 };
            total += weight * log_likelihood(&params, &[r0, r1], 1.0).exp() * h;
        }
        assert!((total - 1.0).abs() < 1e-3, "integral {}", total);
    }

    #[test]
    fn test_true_parameters_beat_distant_ones() {
        let truth = CirParameters::new(0.05, 0.05, 0.008).unwrap();
        let path = simulate(&truth, 2_000, 1.0, &mut SimulationRng::from_seed(3)).unwrap();

        let at_truth = log_likelihood(&truth, &path, 1.0);
        let far_theta = CirParameters::new(0.05, 0.09, 0.008).unwrap();
        let far_sigma = CirParameters::new(0.05, 0.05, 0.02).unwrap();
        let wrong_theta = log_likelihood(&far_theta, &path, 1.0);
        let wrong_sigma = log_likelihood(&far_sigma, &path, 1.0);

        assert!(at_truth.is_finite());
        assert!(at_truth > wrong_theta);
        assert!(at_truth > wrong_sigma);
    }

    #[test]
    fn test_skips_non_positive_observations() {
        let params = CirParameters::new(0.1, 0.05, 0.02).unwrap();
        let rates = [0.05, 0.0, 0.04, 0.045];
        assert_eq!(scored_transitions(&rates), 1);
        let expected = log_likelihood(&params, &[0.04, 0.045], 1.0);
        assert_eq!(log_likelihood(&params, &rates, 1.0), expected);
    }

    #[test]
    fn test_invalid_parameters_are_nan() {
        let params = CirParameters { alpha: -0.1, theta: 0.05, sigma: 0.02 };
        assert!(log_likelihood(&params, &[0.05, 0.04], 1.0).is_nan());
    }
}
