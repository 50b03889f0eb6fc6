//! Load `(date, rate)` CSV series, e.g. a FRED mortgage-rate download

use chrono::NaiveDate;
use csv::ReaderBuilder;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DataError;
use crate::simulation::CirParameters;

/// How rates are written in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateUnits {
    /// 0.0525 for 5.25%
    #[default]
    Fraction,
    /// 5.25 for 5.25%
    Percent,
}

impl RateUnits {
    fn scale(self) -> f64 {
        match self {
            RateUnits::Fraction => 1.0,
            RateUnits::Percent => 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    /// Annual rate as a fraction
    pub rate: f64,
}

/// Chronologically ordered rate observations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateHistory {
    observations: Vec<RateObservation>,
    /// Rows dropped for missing values
    pub missing: usize,
}

impl RateHistory {
    pub fn observations(&self) -> &[RateObservation] {
        &self.observations
    }

    /// Rates in date order, ready for calibration
    pub fn rates(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.rate).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

/// Columns are taken by position: date first, rate second. Header names vary.
#[derive(Debug, Deserialize)]
struct CsvRow(String, String);

/// Load a rate history from a CSV file with a header row
pub fn load_rate_history<P: AsRef<Path>>(
    path: P,
    units: RateUnits,
) -> Result<RateHistory, DataError> {
    let file = std::fs::File::open(path.as_ref())?;
    let history = load_rate_history_from_reader(file, units)?;
    info!(
        "Loaded {} rate observations from {} ({} missing)",
        history.len(),
        path.as_ref().display(),
        history.missing
    );
    Ok(history)
}

/// Load a rate history from any reader (e.g., string buffer, network stream)
pub fn load_rate_history_from_reader<R: std::io::Read>(
    reader: R,
    units: RateUnits,
) -> Result<RateHistory, DataError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut observations = Vec::new();
    let mut missing = 0;

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: CsvRow = record.deserialize(None)?;

        let date = NaiveDate::parse_from_str(&row.0, "%Y-%m-%d")
            .map_err(|_| DataError::InvalidDate { value: row.0.clone(), line })?;

        // FRED marks missing values with "."
        if row.1.is_empty() || row.1 == "." {
            missing += 1;
            continue;
        }
        let rate: f64 = row
            .1
            .parse()
            .map_err(|_| DataError::InvalidRate { value: row.1.clone(), line })?;
        if !rate.is_finite() {
            return Err(DataError::InvalidRate { value: row.1, line });
        }

        observations.push(RateObservation { date, rate: rate * units.scale() });
    }

    if observations.is_empty() {
        return Err(DataError::Empty);
    }

    observations.sort_by_key(|o| o.date);
    debug!("Parsed {} observations, skipped {} missing", observations.len(), missing);

    Ok(RateHistory { observations, missing })
}

/// Load `{ "alpha": .., "theta": .., "sigma": .. }` and validate it
pub fn load_parameters<P: AsRef<Path>>(path: P) -> crate::Result<CirParameters> {
    let file = std::fs::File::open(path).map_err(DataError::from)?;
    let params: CirParameters =
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(DataError::from)?;
    params.validate()?;
    Ok(params)
}
