//! Lifetime cost of a variable-rate mortgage versus renting and investing

use serde::{Deserialize, Serialize};

use super::ratios::RatioRange;
use crate::error::SimulationError;
use crate::mortgage::{
    appreciate, payment_broadcast, term_months, variable_payment, MONTHS_PER_YEAR,
};

/// Property and market assumptions shared by every trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonInputs {
    /// Property price
    pub principal: f64,
    pub term_years: u32,
    /// Annual return on the renter's investment account
    pub investment_appreciation: f64,
    /// Annual property price growth
    pub property_appreciation: f64,
    /// Months between rent resets
    pub lease_term_months: u32,
}

/// Cost difference per ratio for a single trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub mortgage_cost: f64,
    /// Ascending ratios
    pub ratios: Vec<f64>,
    /// mortgage cost − rental net cost; positive means renting was cheaper
    pub differences: Vec<f64>,
}

impl ComparisonResult {
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ratios.iter().copied().zip(self.differences.iter().copied())
    }

    pub fn difference_at(&self, ratio: f64) -> Option<f64> {
        self.ratios
            .iter()
            .position(|&r| (r - ratio).abs() < 1e-12)
            .map(|i| self.differences[i])
    }
}

/// Rent paid each month before scaling by the ratio.
///
/// Re-priced at the start of each lease as the fixed-rate payment on the
/// appreciated property at the prevailing rate, then held until renewal.
pub fn baseline_rent(
    inputs: &ComparisonInputs,
    rates: &[f64],
) -> Result<Vec<f64>, SimulationError> {
    let months = term_months(inputs.term_years) as usize;
    if rates.len() < months {
        return Err(SimulationError::TrajectoryTooShort {
            len: rates.len(),
            required: months,
        });
    }

    let appreciated = appreciate(
        inputs.principal,
        1.0 + inputs.property_appreciation / MONTHS_PER_YEAR as f64,
        months,
    );

    let lease = inputs.lease_term_months.max(1) as usize;
    let renewal_principals: Vec<f64> = appreciated.iter().step_by(lease).copied().collect();
    let renewal_rates: Vec<f64> = rates[..months].iter().step_by(lease).copied().collect();
    let renewal_rents =
        payment_broadcast(&renewal_principals, &renewal_rates, 0.0, inputs.term_years)?;

    Ok((0..months).map(|i| renewal_rents[i / lease]).collect())
}

/// Compare mortgaging against renting at every ratio in `ratios` for one path
pub fn compare(
    inputs: &ComparisonInputs,
    trajectory: &[f64],
    ratios: &RatioRange,
) -> Result<ComparisonResult, SimulationError> {
    let variable_payments = variable_payment(inputs.principal, 0.0, inputs.term_years, trajectory)?;
    let mortgage_cost: f64 = variable_payments.iter().sum();
    let baseline = baseline_rent(inputs, trajectory)?;

    let growth = 1.0 + inputs.investment_appreciation / MONTHS_PER_YEAR as f64;
    let ratio_values = ratios.ratios();
    let mut differences = Vec::with_capacity(ratio_values.len());

    for &ratio in &ratio_values {
        let mut account = 0.0;
        let mut rent_paid = 0.0;
        for (mortgage_payment, base) in variable_payments.iter().zip(&baseline) {
            let rent = base * ratio;
            rent_paid += rent;
            account = account * growth + (mortgage_payment - rent);
        }
        let rental_cost = rent_paid - account;
        differences.push(mortgage_cost - rental_cost);
    }

    if let Some(index) = differences.iter().position(|d| !d.is_finite()) {
        return Err(SimulationError::NonFinite { stage: "rent comparison", index });
    }

    Ok(ComparisonResult { mortgage_cost, ratios: ratio_values, differences })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mortgage::payment;
    use crate::simulation::{simulate, CirParameters, SimulationRng};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn inputs() -> ComparisonInputs {
        ComparisonInputs {
            principal: 700_000.0,
            term_years: 25,
            investment_appreciation: 0.06,
            property_appreciation: 0.03,
            lease_term_months: 12,
        }
    }

    fn ratios() -> RatioRange {
        RatioRange::new(0.6, 0.9, 0.05).unwrap()
    }

    #[test]
    fn test_rent_held_constant_within_lease() {
        let rates = vec![0.05; 300];
        let rent = baseline_rent(&inputs(), &rates).unwrap();

        assert_eq!(rent.len(), 300);
        assert_eq!(rent[0], rent[11]);
        assert!(rent[12] > rent[11]);
        assert_relative_eq!(rent[0], payment(700_000.0, 0.05, 0.0, 25));
        let grown = 700_000.0 * (1.0 + 0.03 / 12.0f64).powi(12);
        assert_relative_eq!(rent[12], payment(grown, 0.05, 0.0, 25), max_relative = 1e-12);
    }

    #[test]
    fn test_partial_final_lease() {
        let mut inputs = inputs();
        inputs.lease_term_months = 7;
        let rent = baseline_rent(&inputs, &vec![0.04; 300]).unwrap();
        assert_eq!(rent.len(), 300);
        assert_eq!(rent[294], rent[299]);
        assert!(rent[294] > rent[293]);
    }

    #[test]
    fn test_hand_computed_difference() {
        let inputs = ComparisonInputs {
            principal: 120_000.0,
            term_years: 1,
            investment_appreciation: 0.0,
            property_appreciation: 0.0,
            lease_term_months: 12,
        };
        let range = RatioRange::new(1.0, 1.0, 0.1).unwrap();
        let result = compare(&inputs, &[0.0; 12], &range).unwrap();

        // Zero rates: mortgage and baseline rent are both 10,000/month, so
        // at ratio 1 nothing is invested and the costs match
        assert_relative_eq!(result.mortgage_cost, 120_000.0);
        assert_relative_eq!(result.differences[0], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cheap_rent_favors_renting() {
        let inputs = ComparisonInputs { investment_appreciation: 0.0, ..inputs() };
        let range = RatioRange::new(0.5, 0.5, 0.1).unwrap();
        let result = compare(&inputs, &vec![0.05; 300], &range).unwrap();
        assert!(result.differences[0] > 0.0);
        assert_eq!(result.difference_at(0.5), Some(result.differences[0]));
    }

    #[test]
    fn test_short_trajectory_is_an_error() {
        let err = compare(&inputs(), &[0.05; 100], &ratios()).unwrap_err();
        assert_eq!(err, SimulationError::TrajectoryTooShort { len: 100, required: 300 });
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_difference_non_increasing_in_ratio(seed in any::<u64>(), invest in -0.05f64..0.15) {
            let params = CirParameters::new(0.05, 0.05, 0.01).unwrap();
            let path = simulate(&params, 300, 1.0, &mut SimulationRng::from_seed(seed)).unwrap();
            let inputs = ComparisonInputs { investment_appreciation: invest, ..inputs() };
            let range = RatioRange::new(0.3, 1.5, 0.05).unwrap();

            let result = compare(&inputs, &path, &range).unwrap();
            prop_assert_eq!(result.ratios.len(), 25);
            for pair in result.differences.windows(2) {
                prop_assert!(pair[1] <= pair[0]);
            }
        }
    }
}
