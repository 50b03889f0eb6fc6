//! Closed-form annuity payments, broadcasting and appreciation

use crate::error::SimulationError;

/// Months per year; all rates are annualized and compounded monthly
pub const MONTHS_PER_YEAR: u32 = 12;

/// Longest mortgage term accepted by run configuration
pub const MAX_TERM_YEARS: u32 = 100;

/// Number of monthly payments in `term_years`, saturating at `u32::MAX`
pub fn term_months(term_years: u32) -> u32 {
    term_years.saturating_mul(MONTHS_PER_YEAR)
}

/// Level payment clearing `balance` in `months` payments at `monthly_rate`.
///
/// Comes from the recurrence a_n = (1+r)·a_{n-1} − c with a_N = 0.
/// A zero rate degenerates to straight-line repayment.
pub fn annuity_payment(balance: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return balance;
    }
    if monthly_rate == 0.0 {
        return balance / months as f64;
    }
    let growth = match i32::try_from(months) {
        Ok(n) => (1.0 + monthly_rate).powi(n),
        Err(_) => (1.0 + monthly_rate).powf(months as f64),
    };
    balance * monthly_rate * growth / (growth - 1.0)
}

/// Monthly payment for a fixed-rate mortgage
///
/// # Arguments
/// * `principal` - Property price
/// * `annual_rate` - Annual rate as a fraction (0.05 = 5%)
/// * `downpayment_fraction` - Fraction of the price paid up front
/// * `term_years` - Mortgage term in years
pub fn payment(
    principal: f64,
    annual_rate: f64,
    downpayment_fraction: f64,
    term_years: u32,
) -> f64 {
    let financed = principal * (1.0 - downpayment_fraction);
    let monthly_rate = annual_rate / MONTHS_PER_YEAR as f64;
    annuity_payment(financed, monthly_rate, term_months(term_years))
}

/// Scalar or sequence argument for [`payment_broadcast`]
#[derive(Debug, Clone, Copy)]
pub enum Broadcast<'a> {
    Scalar(f64),
    Series(&'a [f64]),
}

impl Broadcast<'_> {
    fn len(&self) -> Option<usize> {
        match self {
            Broadcast::Scalar(_) => None,
            Broadcast::Series(values) => Some(values.len()),
        }
    }

    fn at(&self, i: usize) -> f64 {
        match self {
            Broadcast::Scalar(v) => *v,
            Broadcast::Series(values) => values[i],
        }
    }
}

impl From<f64> for Broadcast<'_> {
    fn from(value: f64) -> Self {
        Broadcast::Scalar(value)
    }
}

impl<'a> From<&'a [f64]> for Broadcast<'a> {
    fn from(values: &'a [f64]) -> Self {
        Broadcast::Series(values)
    }
}

impl<'a> From<&'a Vec<f64>> for Broadcast<'a> {
    fn from(values: &'a Vec<f64>) -> Self {
        Broadcast::Series(values.as_slice())
    }
}

/// Elementwise [`payment`] over principals and/or rates.
///
/// Two scalars yield a single-element vector; a scalar paired with a
/// sequence is repeated; two sequences must have equal length.
pub fn payment_broadcast<'a>(
    principal: impl Into<Broadcast<'a>>,
    annual_rate: impl Into<Broadcast<'a>>,
    downpayment_fraction: f64,
    term_years: u32,
) -> Result<Vec<f64>, SimulationError> {
    let principal = principal.into();
    let annual_rate = annual_rate.into();

    let len = match (principal.len(), annual_rate.len()) {
        (Some(left), Some(right)) if left != right => {
            return Err(SimulationError::LengthMismatch { left, right });
        }
        (Some(n), _) | (None, Some(n)) => n,
        (None, None) => 1,
    };

    Ok((0..len)
        .map(|i| payment(principal.at(i), annual_rate.at(i), downpayment_fraction, term_years))
        .collect())
}

/// Monthly payments of a mortgage re-amortized each month at that month's rate
///
/// Month i (1-indexed, n = 12·term total) pays whatever clears the balance in
/// the remaining n−i+1 months at rate_i. Only the first n rates are used.
pub fn variable_payment(
    principal: f64,
    downpayment_fraction: f64,
    term_years: u32,
    rates: &[f64],
) -> Result<Vec<f64>, SimulationError> {
    let schedule = super::variable_schedule(principal, downpayment_fraction, term_years, rates)?;
    Ok(schedule.payments())
}

/// Property values `principal·factor^(i−1)` for months 1..=num_months
pub fn appreciate(principal: f64, monthly_factor: f64, num_months: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(num_months);
    let mut value = principal;
    for _ in 0..num_months {
        values.push(value);
        value *= monthly_factor;
    }
    values
}
