//! Calibrate CIR parameters from a rate history and print them as JSON
//!
//! The output can be passed straight back to `rent_vs_buy --params`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use rent_vs_buy::{calibrate, load_rate_history, CalibrationConfig, RateUnits};

#[derive(Parser)]
#[command(name = "calibrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV of (date, rate) observations
    history: PathBuf,

    /// Rates are percentages (6.5 for 6.5%)
    #[arg(long)]
    percent: bool,

    /// Time between observations (1 = monthly)
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Write the parameters here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let units = if cli.percent { RateUnits::Percent } else { RateUnits::Fraction };
    let history = load_rate_history(&cli.history, units)
        .with_context(|| format!("loading {}", cli.history.display()))?;

    let config = CalibrationConfig { dt: cli.dt, ..Default::default() };
    let calibration = calibrate(&history.rates(), &config)?;

    for warning in &calibration.warnings {
        eprintln!("warning: {}", warning);
    }
    eprintln!(
        "{} observations, log-likelihood {:.4}, {} iterations",
        history.len(),
        calibration.log_likelihood,
        calibration.iterations
    );

    let json = serde_json::to_string_pretty(&calibration.parameters)?;
    match &cli.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", json),
    }

    Ok(())
}
