//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the preprocessing, modeling and aggregation stages
//! - exported to JSON/CSV for an external renderer
//! - inspected in tests without any I/O

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// One dated observation. `value` is `None` for a missing observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// An ordered price series with strictly increasing dates.
///
/// Components read a series and return new ones; nothing mutates a series
/// it was handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    name: String,
    points: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series, rejecting unordered/duplicate dates and non-finite values.
    pub fn new(name: impl Into<String>, points: Vec<Observation>) -> Result<Self, ForecastError> {
        for w in points.windows(2) {
            if w[1].date <= w[0].date {
                return Err(ForecastError::invalid(
                    "series",
                    format!("dates must be strictly increasing ({} then {})", w[0].date, w[1].date),
                ));
            }
        }
        if let Some(bad) = points
            .iter()
            .find(|p| p.value.is_some_and(|v| !v.is_finite()))
        {
            return Err(ForecastError::invalid(
                "series",
                format!("non-finite value on {}", bad.date),
            ));
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    /// Build a fully observed series from `(date, value)` pairs.
    pub fn from_pairs(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, ForecastError> {
        let points = pairs
            .into_iter()
            .map(|(date, value)| Observation::new(date, value))
            .collect();
        Self::new(name, points)
    }

    pub(crate) fn from_sorted(name: String, points: Vec<Observation>) -> Self {
        Self { name, points }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Observed `(date, value)` pairs, skipping missing observations.
    pub fn observed(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.date, v)))
    }

    /// Value recorded on `date`, if the date is present and observed.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .and_then(|i| self.points[i].value)
    }

    /// Prefix of the series with dates `<= date` (inclusive).
    pub fn until(&self, date: NaiveDate) -> TimeSeries {
        let end = self.points.partition_point(|p| p.date <= date);
        Self::from_sorted(self.name.clone(), self.points[..end].to_vec())
    }

    /// The last `n` observations.
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}

/// The last observed `(date, value)` pair a fitted model continues from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub date: NaiveDate,
    pub value: f64,
}

/// Simulated trajectories of absolute price levels.
///
/// Shape is `(num_simulations, num_days)`, stored row-major so each
/// simulation is a contiguous slice. Column 0 is one step after the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatrix {
    num_simulations: usize,
    num_days: usize,
    data: Vec<f64>,
}

impl PathMatrix {
    /// Wrap a row-major buffer.
    pub fn new(num_simulations: usize, num_days: usize, data: Vec<f64>) -> Result<Self, ForecastError> {
        if num_simulations == 0 || num_days == 0 {
            return Err(ForecastError::invalid(
                "paths",
                "path matrix must have at least one simulation and one day",
            ));
        }
        if data.len() != num_simulations * num_days {
            return Err(ForecastError::invalid(
                "paths",
                format!(
                    "buffer of length {} does not match shape ({num_simulations}, {num_days})",
                    data.len()
                ),
            ));
        }
        Ok(Self {
            num_simulations,
            num_days,
            data,
        })
    }

    /// Build from explicit rows. All rows must share the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ForecastError> {
        let num_days = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != num_days) {
            return Err(ForecastError::invalid("paths", "rows have different lengths"));
        }
        Self::new(rows.len(), num_days, rows.concat())
    }

    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_simulations, self.num_days)
    }

    pub fn get(&self, simulation: usize, day: usize) -> f64 {
        self.data[simulation * self.num_days + day]
    }

    pub fn row(&self, simulation: usize) -> &[f64] {
        let start = simulation * self.num_days;
        &self.data[start..start + self.num_days]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.num_days)
    }

    /// Copy of one forecast day across all simulations.
    pub fn column(&self, day: usize) -> Vec<f64> {
        self.rows().map(|r| r[day]).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// One symmetric quantile band across all forecast days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanBand {
    /// Lower tail probability `q`; the upper quantile is taken at `1 - q`.
    pub probability: f64,
    #[serde(with = "nullable_values")]
    pub lower: Vec<f64>,
    #[serde(with = "nullable_values")]
    pub upper: Vec<f64>,
}

/// Aggregated fan chart: bands ordered widest first, plus overlay paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanBands {
    pub bands: Vec<FanBand>,
    #[serde(with = "nullable_rows")]
    pub sample_paths: Vec<Vec<f64>>,
    /// Suggested fill opacity per band (`2 / num_levels`).
    pub band_opacity: f64,
    /// Opacity hint for the overlay paths, passed through from the caller.
    pub sample_opacity: f64,
}

impl FanBands {
    /// Innermost band (closest to the median).
    pub fn innermost(&self) -> Option<&FanBand> {
        self.bands.last()
    }

    /// Outermost band (widest probability range).
    pub fn outermost(&self) -> Option<&FanBand> {
        self.bands.first()
    }
}

/// Simulated levels can overflow (explosive AR(1) fits). JSON has no
/// representation for non-finite numbers, so they are written as `null` and
/// read back as `NaN`.
mod nullable_values {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.is_finite().then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

mod nullable_rows {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            rows.iter()
                .map(|row| row.iter().map(|v| v.is_finite().then_some(*v)).collect::<Vec<_>>()),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let raw = Vec::<Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect())
    }
}

/// Which stochastic model to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Geometric random walk on simple returns.
    #[value(name = "gbm", alias = "random-walk")]
    RandomWalk,
    /// AR(1) on log-normalized levels with a linear drift.
    #[value(name = "ar1", alias = "mean-reverting")]
    MeanReverting,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::RandomWalk => "Random walk (GBM)",
            ModelKind::MeanReverting => "Mean reverting (AR1)",
        }
    }
}

/// Parameters estimated by a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParameters {
    RandomWalk {
        mu: f64,
        sigma: f64,
    },
    MeanReverting {
        /// Slope of log-level against the time index.
        drift: f64,
        phi: f64,
        epsilon: f64,
    },
}

/// Caller-owned context for one asset: what was loaded and in which currency.
#[derive(Debug, Clone)]
pub struct MarketSession {
    pub asset: String,
    pub currency: String,
    pub series: TimeSeries,
}

/// Ratio thresholds used to detect stock splits between adjacent prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitThresholds {
    /// `prev / cur` above this is treated as a forward split.
    pub up: f64,
    /// `prev / cur` below this is treated as a reverse split.
    pub down: f64,
}

impl Default for SplitThresholds {
    fn default() -> Self {
        Self { up: 1.8, down: 0.6 }
    }
}

impl SplitThresholds {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if !(self.down.is_finite() && self.down > 0.0) {
            return Err(ForecastError::invalid("down_threshold", "must be a positive number"));
        }
        if !(self.up.is_finite() && self.up > self.down) {
            return Err(ForecastError::invalid(
                "up_threshold",
                "must be finite and greater than the down threshold",
            ));
        }
        Ok(())
    }
}

/// How raw data is prepared before fitting.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub split_adjust: bool,
    pub thresholds: SplitThresholds,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            split_adjust: true,
            thresholds: SplitThresholds::default(),
        }
    }
}

/// A full forecast run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub model: ModelKind,
    /// Fit on observations up to and including this date (default: all).
    pub train_until: Option<NaiveDate>,
    pub num_days: usize,
    pub num_simulations: usize,
    pub num_levels: usize,
    pub num_sample_paths: usize,
    pub sample_opacity: f64,
    /// Trailing history kept in the output for overlay.
    pub history_days: usize,
    /// Seed for reproducible sampling; `None` uses the thread-local generator.
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::RandomWalk,
            train_until: None,
            num_days: 250,
            num_simulations: 1000,
            num_levels: 10,
            num_sample_paths: 5,
            sample_opacity: 0.3,
            history_days: 500,
            seed: None,
            parallel: false,
        }
    }
}

/// A saved forecast (JSON) for an external renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub asset: String,
    pub currency: String,
    pub model: ModelKind,
    pub parameters: ModelParameters,
    pub anchor: Anchor,
    pub num_simulations: usize,
    /// Business days labelling each forecast column.
    pub dates: Vec<NaiveDate>,
    pub fan: FanBands,
    /// Trailing observed history for context.
    pub history: Vec<Observation>,
}
