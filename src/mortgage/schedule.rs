//! Amortization schedules for fixed and variable rate mortgages

use serde::{Deserialize, Serialize};

use super::payment::{annuity_payment, term_months, MONTHS_PER_YEAR};
use crate::error::SimulationError;

/// One month of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Month index (1-indexed)
    pub month: u32,
    /// Annual rate applied this month
    pub annual_rate: f64,
    pub payment: f64,
    /// Interest accrued on the opening balance
    pub interest: f64,
    /// Balance remaining after this month's payment
    pub remaining_principal: f64,
}

/// Full amortization schedule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MortgageSchedule {
    /// Amount financed (price less downpayment)
    pub financed: f64,
    pub rows: Vec<ScheduleRow>,
}

impl MortgageSchedule {
    pub fn payments(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.payment).collect()
    }

    pub fn total_paid(&self) -> f64 {
        self.rows.iter().map(|row| row.payment).sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|row| row.interest).sum()
    }

    /// Remaining principal after the last row (the financed amount if empty)
    pub fn final_balance(&self) -> f64 {
        self.rows.last().map(|row| row.remaining_principal).unwrap_or(self.financed)
    }
}

/// Schedule for a constant annual rate over the whole term
pub fn fixed_schedule(
    principal: f64,
    annual_rate: f64,
    downpayment_fraction: f64,
    term_years: u32,
) -> MortgageSchedule {
    let months = term_months(term_years) as usize;
    let rates = vec![annual_rate; months];
    // Constant rates always cover the term, so this cannot fail
    amortize(principal * (1.0 - downpayment_fraction), term_years, &rates)
}

/// Schedule re-amortized every month at the prevailing rate
///
/// Uses the first 12·term rates; fewer rates than months is an error.
pub fn variable_schedule(
    principal: f64,
    downpayment_fraction: f64,
    term_years: u32,
    rates: &[f64],
) -> Result<MortgageSchedule, SimulationError> {
    let months = term_months(term_years) as usize;
    if rates.len() < months {
        return Err(SimulationError::TrajectoryTooShort {
            len: rates.len(),
            required: months,
        });
    }
    let financed = principal * (1.0 - downpayment_fraction);
    let schedule = amortize(financed, term_years, &rates[..months]);

    if let Some(index) = schedule.rows.iter().position(|row| !row.payment.is_finite()) {
        return Err(SimulationError::NonFinite { stage: "variable payment", index });
    }
    Ok(schedule)
}

fn amortize(financed: f64, term_years: u32, rates: &[f64]) -> MortgageSchedule {
    let months = term_months(term_years);
    let mut balance = financed;
    let mut rows = Vec::with_capacity(rates.len());

    for (i, &annual_rate) in rates.iter().enumerate() {
        let month = i as u32 + 1;
        let monthly_rate = annual_rate / MONTHS_PER_YEAR as f64;
        let payment = annuity_payment(balance, monthly_rate, months - month + 1);
        let interest = balance * monthly_rate;

        balance = balance - payment + interest;

        rows.push(ScheduleRow {
            month,
            annual_rate,
            payment,
            interest,
            remaining_principal: balance,
        });
    }

    MortgageSchedule { financed, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mortgage::payment;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fixed_schedule_amortizes_to_zero() {
        let schedule = fixed_schedule(400_000.0, 0.045, 0.2, 30);
        assert_eq!(schedule.rows.len(), 360);
        assert_abs_diff_eq!(schedule.final_balance(), 0.0, epsilon = 1e-6);

        let expected = payment(400_000.0, 0.045, 0.2, 30);
        assert_abs_diff_eq!(schedule.rows[0].payment, expected, epsilon = 1e-9);
        let repaid = schedule.total_paid() - schedule.total_interest();
        assert_abs_diff_eq!(repaid, 320_000.0, epsilon = 1e-5);
    }

    #[test]
    fn test_balance_declines_monotonically() {
        let schedule = fixed_schedule(250_000.0, 0.06, 0.0, 15);
        for pair in schedule.rows.windows(2) {
            assert!(pair[1].remaining_principal < pair[0].remaining_principal);
        }
    }

    #[test]
    fn test_variable_schedule_reprices_after_rate_jump() {
        let mut rates = vec![0.03; 120];
        for rate in rates.iter_mut().skip(60) {
            *rate = 0.08;
        }
        let schedule = variable_schedule(300_000.0, 0.0, 10, &rates).unwrap();

        assert_abs_diff_eq!(schedule.rows[0].payment, schedule.rows[59].payment, epsilon = 1e-8);
        assert!(schedule.rows[60].payment > schedule.rows[59].payment);
        assert_abs_diff_eq!(schedule.final_balance(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_variable_schedule_ignores_extra_rates() {
        let rates = vec![0.05; 500];
        let schedule = variable_schedule(100_000.0, 0.0, 10, &rates).unwrap();
        assert_eq!(schedule.rows.len(), 120);
    }

    #[test]
    fn test_variable_schedule_rejects_short_series() {
        let err = variable_schedule(100_000.0, 0.0, 10, &[0.05; 12]).unwrap_err();
        assert_eq!(err, SimulationError::TrajectoryTooShort { len: 12, required: 120 });
    }
}
