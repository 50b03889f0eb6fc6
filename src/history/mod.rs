//! Historical rate series and pre-computed parameter files

mod loader;

pub use loader::{
    load_parameters, load_rate_history, load_rate_history_from_reader, RateHistory,
    RateObservation, RateUnits,
};
