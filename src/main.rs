//! Rent vs Buy CLI
//!
//! Calibrates CIR parameters from a rate history (or loads them from JSON),
//! runs the Monte Carlo comparison and prints the per-ratio table.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use rent_vs_buy::{
    calibrate, load_parameters, load_rate_history, CalibrationConfig, CirParameters,
    RateUnits, ScenarioRunner, SimulationConfig,
};

#[derive(Parser)]
#[command(name = "rent_vs_buy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV of (date, rate) observations to calibrate from
    #[arg(long, conflicts_with = "params")]
    history: Option<PathBuf>,

    /// Rates in the history file are percentages (6.5 for 6.5%)
    #[arg(long)]
    percent: bool,

    /// JSON file with pre-computed alpha, theta, sigma
    #[arg(long)]
    params: Option<PathBuf>,

    /// JSON run configuration; omitted fields take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Property price
    #[arg(long)]
    principal: Option<f64>,

    /// Mortgage term in years
    #[arg(long)]
    term_years: Option<u32>,

    /// Number of simulated paths
    #[arg(short = 'n', long)]
    trajectories: Option<usize>,

    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write per-ratio statistics to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(principal) = cli.principal {
        config.principal = principal;
    }
    if let Some(term_years) = cli.term_years {
        config.term_years = term_years;
    }
    if let Some(trajectories) = cli.trajectories {
        config.num_trajectories = trajectories;
    }
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let (params, warnings): (CirParameters, _) = match (&cli.params, &cli.history) {
        (Some(path), _) => {
            let params = load_parameters(path)
                .with_context(|| format!("loading parameters from {}", path.display()))?;
            (params, Vec::new())
        }
        (None, Some(path)) => {
            let units = if cli.percent { RateUnits::Percent } else { RateUnits::Fraction };
            let history = load_rate_history(path, units)
                .with_context(|| format!("loading rate history from {}", path.display()))?;
            let calibration = calibrate(&history.rates(), &CalibrationConfig::default())
                .context("calibrating CIR parameters")?;
            (calibration.parameters, calibration.warnings)
        }
        (None, None) => bail!("either --history or --params is required"),
    };

    println!("CIR parameters");
    println!("  alpha: {:.6}", params.alpha);
    println!("  theta: {:.6}", params.theta);
    println!("  sigma: {:.6}", params.sigma);
    println!();

    let start = Instant::now();
    let report = ScenarioRunner::new(config, params)
        .with_calibration_warnings(warnings)
        .run()?;
    info!("Simulation finished in {:?}", start.elapsed());

    println!(
        "{} trials ({} excluded), seed {}",
        report.trials_completed, report.excluded_trials, report.base_seed
    );
    println!();
    println!("{:>8} {:>14} {:>18}", "Ratio", "P(rent wins)", "Mean difference");
    for row in &report.statistics.ratios {
        println!(
            "{:>8.3} {:>14.4} {:>18.2}",
            row.ratio, row.favor_rent_probability, row.mean_cost_difference
        );
    }
    match report.statistics.break_even_ratio() {
        Some(ratio) => println!("\nRenting stops winning most paths at ratio {:.3}", ratio),
        None => println!("\nRenting wins most paths at every ratio tested"),
    }

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }

    if let Some(path) = &cli.output {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        report.statistics.write_csv(BufWriter::new(file))?;
        println!("\nStatistics written to {}", path.display());
    }

    Ok(())
}
