//! Mortgage arithmetic: fixed and variable rate payments, appreciation

mod payment;
mod schedule;

pub use payment::{
    annuity_payment, appreciate, payment, payment_broadcast, term_months, variable_payment,
    Broadcast, MAX_TERM_YEARS, MONTHS_PER_YEAR,
};
pub use schedule::{fixed_schedule, variable_schedule, MortgageSchedule, ScheduleRow};
