//! The fit-then-sample model capability shared by all price models.
//!
//! State machine:
//!
//! ```text
//! Unfitted --fit--> Fitted --fit--> Fitted (parameters overwritten)
//! ```
//!
//! `fit` validates everything before touching state, so a failed re-fit
//! leaves the previous parameters in place.

use crate::domain::{Anchor, ModelKind, ModelParameters, PathMatrix, TimeSeries};
use crate::error::ForecastError;
use crate::models::shock::{RngShocks, ShockSource};
use crate::models::{MeanRevertingModel, RandomWalkModel};

/// Minimum observed points any model needs to estimate a step.
pub const MIN_FIT_POINTS: usize = 2;

pub trait ForecastModel: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> ModelKind;

    /// Estimate parameters from a gap-free series and anchor at its last observation.
    fn fit(&mut self, series: &TimeSeries) -> Result<(), ForecastError>;

    /// Last observed point sampling continues from. `None` until fitted.
    fn anchor(&self) -> Option<Anchor>;

    fn parameters(&self) -> Option<ModelParameters>;

    /// Write one simulated trajectory of price levels into `out`.
    ///
    /// `out[0]` is the first forecast day.
    fn simulate_path(&self, shocks: &mut dyn ShockSource, out: &mut [f64]) -> Result<(), ForecastError>;

    fn is_fitted(&self) -> bool {
        self.anchor().is_some()
    }

    /// Sample a `(num_simulations, num_days)` path matrix from an injected source.
    fn sample_with(
        &self,
        num_days: usize,
        num_simulations: usize,
        shocks: &mut dyn ShockSource,
    ) -> Result<PathMatrix, ForecastError> {
        let len = validate_sample_args(num_days, num_simulations)?;
        if !self.is_fitted() {
            return Err(ForecastError::ModelNotFitted);
        }

        let mut data = vec![0.0; len];
        for row in data.chunks_exact_mut(num_days) {
            self.simulate_path(shocks, row)?;
        }
        PathMatrix::new(num_simulations, num_days, data)
    }

    /// Sample using the thread-local generator.
    fn sample(&self, num_days: usize, num_simulations: usize) -> Result<PathMatrix, ForecastError> {
        let mut shocks = RngShocks::new(rand::thread_rng());
        self.sample_with(num_days, num_simulations, &mut shocks)
    }
}

impl ModelKind {
    /// Construct an unfitted model of this kind.
    pub fn build(self) -> Box<dyn ForecastModel> {
        match self {
            ModelKind::RandomWalk => Box::new(RandomWalkModel::new()),
            ModelKind::MeanReverting => Box::new(MeanRevertingModel::new()),
        }
    }
}

/// Check sampling dimensions and return the total buffer length.
pub fn validate_sample_args(num_days: usize, num_simulations: usize) -> Result<usize, ForecastError> {
    if num_days == 0 {
        return Err(ForecastError::invalid("num_days", "must be >= 1"));
    }
    if num_simulations == 0 {
        return Err(ForecastError::invalid("num_simulations", "must be >= 1"));
    }
    num_days
        .checked_mul(num_simulations)
        .ok_or_else(|| ForecastError::invalid("num_simulations", "path matrix size overflows"))
}

/// Observed prices of a fitting window plus the anchor (last observation).
///
/// Rejects windows with fewer than two points and prices that are not
/// strictly positive, since both models divide by and take logs of prices.
pub(crate) fn fitting_window(series: &TimeSeries) -> Result<(Vec<f64>, Anchor), ForecastError> {
    let observed: Vec<_> = series.observed().collect();
    if observed.len() < MIN_FIT_POINTS {
        return Err(ForecastError::InsufficientData {
            required: MIN_FIT_POINTS,
            actual: observed.len(),
        });
    }
    if let Some((date, v)) = observed.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
        return Err(ForecastError::NumericalDegeneracy(format!(
            "price on {date} must be positive, got {v}"
        )));
    }

    let (date, value) = observed[observed.len() - 1];
    let prices = observed.into_iter().map(|(_, v)| v).collect();
    Ok((prices, Anchor { date, value }))
}
