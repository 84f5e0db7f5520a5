//! Shared "forecast pipeline" logic used by the CLI subcommands and tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! prepare -> training window -> fit -> sample -> aggregate
//!
//! Nothing here touches files or the environment; callers own the
//! `MarketSession` and hand it in explicitly.

use chrono::NaiveDate;
use tracing::info;

use crate::data::{business_days_after, prepare_series};
use crate::domain::{
    Anchor, FanBands, ForecastConfig, ForecastFile, MarketSession, ModelKind, ModelParameters,
    Observation, PathMatrix, PreprocessConfig, TimeSeries,
};
use crate::error::{AppError, ForecastError};
use crate::fan::aggregate;
use crate::models::simulate;

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub asset: String,
    pub currency: String,
    pub model: ModelKind,
    pub parameters: ModelParameters,
    pub anchor: Anchor,
    pub training_points: usize,
    /// Business days labelling each path column.
    pub dates: Vec<NaiveDate>,
    pub paths: PathMatrix,
    pub fan: FanBands,
    pub history: Vec<Observation>,
}

impl ForecastOutput {
    pub fn to_file(&self) -> ForecastFile {
        ForecastFile {
            tool: "probwave".to_string(),
            asset: self.asset.clone(),
            currency: self.currency.clone(),
            model: self.model,
            parameters: self.parameters,
            anchor: self.anchor,
            num_simulations: self.paths.num_simulations(),
            dates: self.dates.clone(),
            fan: self.fan.clone(),
            history: self.history.clone(),
        }
    }
}

/// Clean freshly loaded data and wrap it in a session.
pub fn prepare_session(
    asset: &str,
    currency: &str,
    raw: &TimeSeries,
    rates: Option<&TimeSeries>,
    config: &PreprocessConfig,
) -> Result<MarketSession, AppError> {
    let series = prepare_series(raw, rates, config)?;
    info!(
        asset,
        currency,
        raw_points = raw.len(),
        clean_points = series.len(),
        converted = rates.is_some(),
        "prepared series"
    );
    Ok(MarketSession {
        asset: asset.to_string(),
        currency: currency.to_string(),
        series,
    })
}

/// Execute the full forecasting pipeline on a prepared session.
pub fn run_forecast(session: &MarketSession, config: &ForecastConfig) -> Result<ForecastOutput, AppError> {
    // 1) Training window.
    let train = match config.train_until {
        Some(date) => session.series.until(date),
        None => session.series.clone(),
    };

    // 2) Fit.
    let mut model = config.model.build();
    model.fit(&train)?;
    let anchor = model.anchor().ok_or(ForecastError::ModelNotFitted)?;
    let parameters = model.parameters().ok_or(ForecastError::ModelNotFitted)?;
    info!(
        model = config.model.display_name(),
        anchor_date = %anchor.date,
        anchor_value = anchor.value,
        training_points = train.len(),
        "fitted model"
    );

    // 3) Sample.
    let paths = match (config.seed, config.parallel) {
        (Some(seed), parallel) => simulate(model.as_ref(), config.num_days, config.num_simulations, seed, parallel)?,
        (None, true) => simulate(
            model.as_ref(),
            config.num_days,
            config.num_simulations,
            rand::random::<u64>(),
            true,
        )?,
        (None, false) => model.sample(config.num_days, config.num_simulations)?,
    };

    // 4) Aggregate.
    let fan = aggregate(
        &paths,
        config.num_levels,
        config.num_sample_paths,
        config.sample_opacity,
    )?;
    info!(
        num_days = config.num_days,
        num_simulations = config.num_simulations,
        num_levels = config.num_levels,
        "built fan chart"
    );

    Ok(ForecastOutput {
        asset: session.asset.clone(),
        currency: session.currency.clone(),
        model: config.model,
        parameters,
        anchor,
        training_points: train.len(),
        dates: business_days_after(anchor.date, config.num_days),
        paths,
        fan,
        history: session.series.tail(config.history_days).to_vec(),
    })
}
