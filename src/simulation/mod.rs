//! Rate path simulation

mod cir;
mod rng;

pub use cir::{simulate, CirParameters, Trajectory};
pub use rng::{trial_seed, SimulationRng};
