//! Per-trajectory rent versus mortgage comparison

mod comparator;
mod ratios;

pub use comparator::{baseline_rent, compare, ComparisonInputs, ComparisonResult};
pub use ratios::{RatioRange, MAX_RATIOS};
