//! Geometric random walk on simple daily returns.
//!
//! Fit:
//! - `r_t = x_t / x_{t-1} - 1` over consecutive observed prices
//! - `mu` = mean of `r_t`, `sigma` = sample std of `r_t` (N - 1)
//!
//! Sample: draw `r ~ Normal(mu, sigma)` per day, path = `X0 · Π (1 + r)`.
//!
//! A drawn return below -1 yields a negative level. This is tolerated as-is;
//! no floor is applied.

use tracing::debug;

use crate::domain::{Anchor, ModelKind, ModelParameters, TimeSeries};
use crate::error::ForecastError;
use crate::math::{mean, sample_std};
use crate::models::model::{ForecastModel, fitting_window};
use crate::models::shock::ShockSource;

#[derive(Debug, Clone, Copy, PartialEq)]
struct RandomWalkFit {
    mu: f64,
    sigma: f64,
    anchor: Anchor,
}

#[derive(Debug, Clone, Default)]
pub struct RandomWalkModel {
    fitted: Option<RandomWalkFit>,
}

impl RandomWalkModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model in the fitted state with explicit parameters.
    pub fn from_parameters(mu: f64, sigma: f64, anchor: Anchor) -> Result<Self, ForecastError> {
        if !mu.is_finite() {
            return Err(ForecastError::invalid("mu", "must be finite"));
        }
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(ForecastError::invalid("sigma", "must be finite and >= 0"));
        }
        Ok(Self {
            fitted: Some(RandomWalkFit { mu, sigma, anchor }),
        })
    }

    pub fn mu(&self) -> Option<f64> {
        self.fitted.map(|f| f.mu)
    }

    pub fn sigma(&self) -> Option<f64> {
        self.fitted.map(|f| f.sigma)
    }
}

impl ForecastModel for RandomWalkModel {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomWalk
    }

    fn fit(&mut self, series: &TimeSeries) -> Result<(), ForecastError> {
        let (prices, anchor) = fitting_window(series)?;

        let returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let (Some(mu), Some(sigma)) = (mean(&returns), sample_std(&returns)) else {
            return Err(ForecastError::InsufficientData {
                required: 2,
                actual: prices.len(),
            });
        };
        if !(mu.is_finite() && sigma.is_finite()) {
            return Err(ForecastError::NumericalDegeneracy(
                "non-finite return statistics".to_string(),
            ));
        }

        debug!(mu, sigma, anchor_date = %anchor.date, x0 = anchor.value, n = prices.len(), "fitted random walk");
        self.fitted = Some(RandomWalkFit { mu, sigma, anchor });
        Ok(())
    }

    fn anchor(&self) -> Option<Anchor> {
        self.fitted.map(|f| f.anchor)
    }

    fn parameters(&self) -> Option<ModelParameters> {
        self.fitted.map(|f| ModelParameters::RandomWalk {
            mu: f.mu,
            sigma: f.sigma,
        })
    }

    fn simulate_path(&self, shocks: &mut dyn ShockSource, out: &mut [f64]) -> Result<(), ForecastError> {
        let fit = self.fitted.ok_or(ForecastError::ModelNotFitted)?;

        let mut growth = 1.0;
        for slot in out.iter_mut() {
            growth *= 1.0 + shocks.normal(fit.mu, fit.sigma);
            *slot = fit.anchor.value * growth;
        }
        Ok(())
    }
}
