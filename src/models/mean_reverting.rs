//! AR(1) on log-normalized price levels with a linear drift.
//!
//! Fit, with `X0` the last observed price:
//!
//! ```text
//! Y_i   = ln(x_i / X0)                  (so Y ends at 0)
//! Y_i  ≈ a · t_i,   t_i = i - n         (past time index -n..-1, no intercept)
//! Y_i  ≈ phi · Y_{i-1}                  (no intercept)
//! epsilon = std(residuals of the AR fit)  (N denominator)
//! ```
//!
//! Sample, per path and forecast day `t = 0..num_days-1`:
//!
//! ```text
//! Y_0 = 0,  Y_{t+1} = phi · Y_t + epsilon · N(0, 1)
//! X_t = X0 · exp(Y_t + a · t)
//! ```
//!
//! `phi` is not constrained to `|phi| < 1`; an explosive fit produces
//! diverging paths and is reported with a warning only.

use tracing::{debug, warn};

use crate::domain::{Anchor, ModelKind, ModelParameters, TimeSeries};
use crate::error::ForecastError;
use crate::math::{population_std, regress_through_origin};
use crate::models::model::{ForecastModel, fitting_window};
use crate::models::shock::ShockSource;

#[derive(Debug, Clone, Copy, PartialEq)]
struct MeanRevertingFit {
    drift: f64,
    phi: f64,
    epsilon: f64,
    anchor: Anchor,
}

#[derive(Debug, Clone, Default)]
pub struct MeanRevertingModel {
    fitted: Option<MeanRevertingFit>,
}

impl MeanRevertingModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model in the fitted state with explicit parameters.
    pub fn from_parameters(drift: f64, phi: f64, epsilon: f64, anchor: Anchor) -> Result<Self, ForecastError> {
        if !drift.is_finite() {
            return Err(ForecastError::invalid("drift", "must be finite"));
        }
        if !phi.is_finite() {
            return Err(ForecastError::invalid("phi", "must be finite"));
        }
        if !(epsilon.is_finite() && epsilon >= 0.0) {
            return Err(ForecastError::invalid("epsilon", "must be finite and >= 0"));
        }
        Ok(Self {
            fitted: Some(MeanRevertingFit {
                drift,
                phi,
                epsilon,
                anchor,
            }),
        })
    }

    pub fn drift(&self) -> Option<f64> {
        self.fitted.map(|f| f.drift)
    }

    pub fn phi(&self) -> Option<f64> {
        self.fitted.map(|f| f.phi)
    }

    pub fn epsilon(&self) -> Option<f64> {
        self.fitted.map(|f| f.epsilon)
    }
}

impl ForecastModel for MeanRevertingModel {
    fn kind(&self) -> ModelKind {
        ModelKind::MeanReverting
    }

    fn fit(&mut self, series: &TimeSeries) -> Result<(), ForecastError> {
        let (prices, anchor) = fitting_window(series)?;
        let n = prices.len();

        let y: Vec<f64> = prices.iter().map(|p| (p / anchor.value).ln()).collect();
        let past_time: Vec<f64> = (0..n).map(|i| i as f64 - n as f64).collect();

        let drift = regress_through_origin(&past_time, &y).ok_or_else(|| {
            ForecastError::NumericalDegeneracy("drift regression failed".to_string())
        })?;

        let (pre, post) = (&y[..n - 1], &y[1..]);
        let phi = regress_through_origin(pre, post).ok_or_else(|| {
            ForecastError::NumericalDegeneracy("AR(1) regression failed".to_string())
        })?;

        let residuals: Vec<f64> = pre.iter().zip(post).map(|(a, b)| b - phi * a).collect();
        let epsilon = population_std(&residuals).ok_or(ForecastError::InsufficientData {
            required: 2,
            actual: n,
        })?;

        if !(drift.is_finite() && phi.is_finite() && epsilon.is_finite()) {
            return Err(ForecastError::NumericalDegeneracy(
                "non-finite AR(1) parameters".to_string(),
            ));
        }
        if phi.abs() >= 1.0 {
            warn!(phi, "AR(1) coefficient is not stationary; simulated paths will diverge");
        }

        debug!(drift, phi, epsilon, anchor_date = %anchor.date, x0 = anchor.value, n, "fitted mean-reverting model");
        self.fitted = Some(MeanRevertingFit {
            drift,
            phi,
            epsilon,
            anchor,
        });
        Ok(())
    }

    fn anchor(&self) -> Option<Anchor> {
        self.fitted.map(|f| f.anchor)
    }

    fn parameters(&self) -> Option<ModelParameters> {
        self.fitted.map(|f| ModelParameters::MeanReverting {
            drift: f.drift,
            phi: f.phi,
            epsilon: f.epsilon,
        })
    }

    fn simulate_path(&self, shocks: &mut dyn ShockSource, out: &mut [f64]) -> Result<(), ForecastError> {
        let fit = self.fitted.ok_or(ForecastError::ModelNotFitted)?;

        let mut y = 0.0;
        for (t, slot) in out.iter_mut().enumerate() {
            if t > 0 {
                y = fit.phi * y + shocks.normal(0.0, fit.epsilon);
            }
            *slot = fit.anchor.value * (y + fit.drift * t as f64).exp();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::shock::{ConstantShock, RngShocks};
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> TimeSeries {
        let dates = crate::data::business_days_after(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values.len());
        TimeSeries::from_pairs("t", dates.into_iter().zip(values.iter().copied())).unwrap()
    }

    fn anchor(value: f64) -> Anchor {
        Anchor {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            value,
        }
    }

    #[test]
    fn fit_matches_closed_form_regressions() {
        let prices = [95.0, 97.0, 96.0, 99.0, 101.0, 100.0];
        let mut model = MeanRevertingModel::new();
        model.fit(&series(&prices)).unwrap();

        let x0 = 100.0;
        let y: Vec<f64> = prices.iter().map(|p| (p / x0).ln()).collect();
        let n = y.len() as f64;
        let t: Vec<f64> = (0..y.len()).map(|i| i as f64 - n).collect();
        let a = t.iter().zip(&y).map(|(t, y)| t * y).sum::<f64>() / t.iter().map(|t| t * t).sum::<f64>();
        let phi = y[..5].iter().zip(&y[1..]).map(|(p, q)| p * q).sum::<f64>()
            / y[..5].iter().map(|p| p * p).sum::<f64>();
        let res: Vec<f64> = y[..5].iter().zip(&y[1..]).map(|(p, q)| q - phi * p).collect();
        let eps = crate::math::population_std(&res).unwrap();

        assert!((model.drift().unwrap() - a).abs() < 1e-10);
        assert!((model.phi().unwrap() - phi).abs() < 1e-10);
        assert!((model.epsilon().unwrap() - eps).abs() < 1e-10);
        assert_eq!(model.anchor().unwrap().value, x0);
    }

    #[test]
    fn constant_series_gives_flat_paths() {
        let mut model = MeanRevertingModel::new();
        model.fit(&series(&[20.0; 5])).unwrap();
        assert_eq!(model.drift(), Some(0.0));
        assert_eq!(model.phi(), Some(0.0));
        assert_eq!(model.epsilon(), Some(0.0));

        let paths = model.sample(6, 3).unwrap();
        assert!(paths.as_slice().iter().all(|v| *v == 20.0));
    }

    #[test]
    fn zero_epsilon_paths_follow_drift() {
        let model = MeanRevertingModel::from_parameters(0.01, 0.9, 0.0, anchor(50.0)).unwrap();
        let paths = model.sample_with(5, 4, &mut RngShocks::seeded(3)).unwrap();

        let expected: Vec<f64> = (0..5).map(|t| 50.0 * (0.01 * t as f64).exp()).collect();
        for row in paths.rows() {
            assert_eq!(row, expected.as_slice());
        }
    }

    #[test]
    fn shocks_follow_ar_recursion() {
        let model = MeanRevertingModel::from_parameters(0.0, 0.5, 1.0, anchor(10.0)).unwrap();
        let paths = model.sample_with(4, 1, &mut ConstantShock(0.2)).unwrap();

        // Y: 0, 0.2, 0.3, 0.35
        let expected = [0.0_f64, 0.2, 0.3, 0.35].map(|y| 10.0 * y.exp());
        for (got, want) in paths.row(0).iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn produces_exactly_num_days_columns() {
        let mut model = MeanRevertingModel::new();
        model.fit(&series(&[10.0, 10.4, 10.1, 10.6, 10.3])).unwrap();
        for days in [1, 2, 9] {
            let paths = model.sample_with(days, 2, &mut RngShocks::seeded(1)).unwrap();
            assert_eq!(paths.shape(), (2, days));
            assert_eq!(paths.get(0, 0), 10.3);
        }
    }

    #[test]
    fn explosive_phi_diverges_without_error() {
        let model = MeanRevertingModel::from_parameters(0.0, 1.5, 1.0, anchor(1.0)).unwrap();
        let paths = model.sample_with(12, 1, &mut ConstantShock(0.1)).unwrap();
        let row = paths.row(0);

        // Y_t = 1.5 * Y_{t-1} + 0.1 from Y_0 = 0.
        let mut y = 0.0;
        for (t, v) in row.iter().enumerate() {
            if t > 0 {
                y = 1.5 * y + 0.1;
            }
            assert!((v.ln() - y).abs() < 1e-9 * y.abs().max(1.0), "day {t}: {v}");
        }
        assert!((row[3].ln() - 0.475).abs() < 1e-12);
        assert!(row.windows(2).all(|w| w[1] > w[0]));
        assert!(row[11] > 1e10);
    }

    #[test]
    fn failed_refit_keeps_previous_parameters() {
        let mut model = MeanRevertingModel::new();
        model.fit(&series(&[10.0, 11.0, 10.5])).unwrap();
        let before = model.parameters();

        assert!(matches!(
            model.fit(&series(&[10.0, -1.0])).unwrap_err(),
            ForecastError::NumericalDegeneracy(_)
        ));
        assert_eq!(model.parameters(), before);
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let mut model = MeanRevertingModel::new();
        model.fit(&series(&[10.0, 10.4, 10.1, 10.6, 10.3, 10.8])).unwrap();
        let a = model.sample_with(20, 5, &mut RngShocks::seeded(11)).unwrap();
        let b = model.sample_with(20, 5, &mut RngShocks::seeded(11)).unwrap();
        assert_eq!(a, b);
    }
}
