//! Command-line parsing for the fan chart forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "probwave", version, about = "Probabilistic price forecasts as fan charts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model to a price history, simulate paths and summarize them as bands.
    Forecast(ForecastArgs),
    /// Clean a price history (gap fill, split adjust, convert) and write it back out.
    Clean(CleanArgs),
    /// Print the summary of a previously exported forecast JSON.
    Show(ShowArgs),
}

/// Input data and preparation options shared by `forecast` and `clean`.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Price history CSV (`date` column plus `close`/`adj_close`/`price`/`value`).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Exchange-rate CSV (asset currency per target currency) to convert prices.
    #[arg(long, value_name = "CSV")]
    pub fx: Option<PathBuf>,

    /// Asset label for reports (defaults to the input file stem).
    #[arg(long)]
    pub asset: Option<String>,

    /// Currency label of the (converted) prices.
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Skip stock split detection.
    #[arg(long)]
    pub no_split_adjust: bool,

    /// `prev / cur` ratio above which a forward split is detected.
    #[arg(long, default_value_t = 1.8)]
    pub split_up: f64,

    /// `prev / cur` ratio below which a reverse split is detected.
    #[arg(long, default_value_t = 0.6)]
    pub split_down: f64,
}

/// Options for `probwave forecast`.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Which model to fit.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::RandomWalk)]
    pub model: ModelKind,

    /// Fit on data up to and including this date (YYYY-MM-DD). Defaults to all data.
    #[arg(long, value_name = "DATE")]
    pub train_until: Option<NaiveDate>,

    /// Number of business days to forecast.
    #[arg(short = 'd', long, default_value_t = 250)]
    pub days: usize,

    /// Number of simulated paths.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub sims: usize,

    /// Number of quantile bands.
    #[arg(long, default_value_t = 10)]
    pub levels: usize,

    /// Number of raw paths kept for overlay.
    #[arg(long, default_value_t = 5)]
    pub samples: usize,

    /// Opacity hint for overlay paths (0..=1).
    #[arg(long, default_value_t = 0.3)]
    pub sample_opacity: f64,

    /// Trailing history days included in the JSON export.
    #[arg(long, default_value_t = 500)]
    pub history_days: usize,

    /// Random seed for reproducible paths.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulate paths on all cores.
    #[arg(long)]
    pub parallel: bool,

    /// Export bands to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full forecast (parameters, bands, samples, history) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for `probwave clean`.
#[derive(Debug, Args, Clone)]
pub struct CleanArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Where to write the cleaned series CSV.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,
}

/// Options for `probwave show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Forecast JSON file produced by `probwave forecast --export-json`.
    #[arg(long, value_name = "JSON")]
    pub forecast: PathBuf,
}
