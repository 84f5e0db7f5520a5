//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads and prepares price data
//! - runs the forecast pipeline
//! - prints reports and writes optional exports

use std::path::Path;

use clap::Parser;
use tracing::{debug, warn};

use crate::cli::{CleanArgs, Command, DataArgs, ForecastArgs, ShowArgs};
use crate::domain::{ForecastConfig, MarketSession, PreprocessConfig, SplitThresholds, TimeSeries};
use crate::error::AppError;
use crate::io::{IngestedSeries, load_series};

pub mod pipeline;

/// Entry point for the `probwave` binary.
pub fn run() -> Result<(), AppError> {
    // Optional: a local `.env` may set RUST_LOG.
    dotenvy::dotenv().ok();
    crate::logging::init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Clean(args) => handle_clean(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let session = load_session(&args.data)?;
    let config = forecast_config_from_args(&args);
    let output = pipeline::run_forecast(&session, &config)?;

    println!("{}", crate::report::format_run_summary(&output));

    if let Some(path) = &args.export {
        crate::io::write_bands_csv(path, &output.dates, &output.fan)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::write_forecast_json(path, &output.to_file())?;
    }

    Ok(())
}

fn handle_clean(args: CleanArgs) -> Result<(), AppError> {
    let session = load_session(&args.data)?;
    crate::io::write_series_csv(&args.output, &session.series)?;
    println!(
        "Wrote {} business days of {} ({}) to {}",
        session.series.len(),
        session.asset,
        session.currency,
        args.output.display()
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let forecast = crate::io::read_forecast_json(&args.forecast)?;
    println!("{}", crate::report::format_forecast(&forecast));
    Ok(())
}

fn load_session(args: &DataArgs) -> Result<MarketSession, AppError> {
    let raw = load_reported(&args.input)?;
    let rates = args.fx.as_deref().map(load_reported).transpose()?;

    let asset = args
        .asset
        .clone()
        .unwrap_or_else(|| raw.name().to_string());
    pipeline::prepare_session(
        &asset,
        &args.currency,
        &raw,
        rates.as_ref(),
        &preprocess_config_from_args(args),
    )
}

fn load_reported(path: &Path) -> Result<TimeSeries, AppError> {
    let IngestedSeries {
        series,
        value_column,
        row_errors,
        rows_read,
    } = load_series(path)?;

    for err in row_errors.iter().take(5) {
        warn!(file = %path.display(), line = err.line, "{}", err.message);
    }
    if row_errors.len() > 5 {
        warn!(file = %path.display(), more = row_errors.len() - 5, "further row errors suppressed");
    }
    debug!(file = %path.display(), value_column = %value_column, rows_read, "loaded series");
    Ok(series)
}

pub fn preprocess_config_from_args(args: &DataArgs) -> PreprocessConfig {
    PreprocessConfig {
        split_adjust: !args.no_split_adjust,
        thresholds: SplitThresholds {
            up: args.split_up,
            down: args.split_down,
        },
    }
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        model: args.model,
        train_until: args.train_until,
        num_days: args.days,
        num_simulations: args.sims,
        num_levels: args.levels,
        num_sample_paths: args.samples,
        sample_opacity: args.sample_opacity,
        history_days: args.history_days,
        seed: args.seed,
        parallel: args.parallel,
    }
}
