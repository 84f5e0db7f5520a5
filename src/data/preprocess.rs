//! Raw price series cleaning and adjustment.
//!
//! All functions here are pure: they take a series by reference and return a
//! new one. No randomness and no hidden state, so the same input always yields
//! the same output.
//!
//! Preparation order used by the pipeline (`prepare_series`):
//!
//! ```text
//! fill gaps -> split adjust -> currency convert -> split adjust
//! ```
//!
//! The second split pass catches jumps introduced by the conversion itself
//! (e.g. a currency redenomination in the rate series).

use tracing::{info, warn};

use crate::data::calendar::is_business_day;
use crate::domain::{Observation, PreprocessConfig, SplitThresholds, TimeSeries};
use crate::error::ForecastError;

/// Reindex onto business days between the first and last date, forward-filling gaps.
///
/// The fill runs over the full daily calendar (weekends included), so a value
/// observed on a Saturday still carries into the following Monday. Dates before
/// the first observed value stay missing.
pub fn fill_business_day_gaps(series: &TimeSeries) -> Result<TimeSeries, ForecastError> {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return Err(ForecastError::EmptyInput);
    };
    if series.observed().next().is_none() {
        return Err(ForecastError::EmptyInput);
    }

    let mut observed = series.points().iter().peekable();
    let mut carried: Option<f64> = None;
    let mut out = Vec::with_capacity(series.len());

    for date in first.iter_days().take_while(|d| *d <= last) {
        if let Some(p) = observed.next_if(|p| p.date == date) {
            if p.value.is_some() {
                carried = p.value;
            }
        }
        if is_business_day(date) {
            out.push(Observation {
                date,
                value: carried,
            });
        }
    }

    Ok(TimeSeries::from_sorted(series.name().to_string(), out))
}

/// Backward-adjust historical prices for stock splits.
///
/// For each adjacent observed pair, `ratio = prev / cur`:
/// - `ratio > up`: forward split, every earlier value is divided by `round(ratio)`
/// - `ratio < down`: reverse split, every earlier value is multiplied by `round(cur / prev)`
///
/// Rounding is `f64::round` (half away from zero). Factors compound: a value is
/// scaled by every split detected after it, so the latest price is never
/// altered. Detection looks at raw adjacent prices, because an adjustment only
/// ever touches values strictly before the split date.
///
/// Missing values stay missing and break the pair they belong to.
pub fn adjust_for_splits(
    series: &TimeSeries,
    thresholds: SplitThresholds,
) -> Result<TimeSeries, ForecastError> {
    thresholds.validate()?;

    let points = series.points();
    if points.len() <= 1 {
        return Ok(series.clone());
    }

    // (multiplier, divisor) applied to every value strictly before index i.
    // Kept as separate integer products so a factor-3 split divides exactly.
    let mut steps = vec![(1.0_f64, 1.0_f64); points.len()];

    for i in 1..points.len() {
        let (Some(prev), Some(cur)) = (points[i - 1].value, points[i].value) else {
            continue;
        };
        if prev <= 0.0 || cur <= 0.0 {
            warn!(date = %points[i].date, prev, cur, "skipping split check on non-positive price");
            continue;
        }

        let ratio = prev / cur;
        let forward = ratio > thresholds.up;
        if !forward && ratio >= thresholds.down {
            continue;
        }
        let factor = (if forward { ratio } else { cur / prev }).round();
        // Loose custom thresholds can flag a jump that rounds to no split at all.
        if factor < 1.0 {
            warn!(date = %points[i].date, ratio, "ignoring split jump that rounds to zero");
            continue;
        }

        if forward {
            steps[i] = (1.0, factor);
            info!(date = %points[i].date, factor, "forward split detected ({factor}:1)");
        } else {
            steps[i] = (factor, 1.0);
            info!(date = %points[i].date, factor, "reverse split detected (1:{factor})");
        }
    }

    let mut out = points.to_vec();
    let mut mul = 1.0;
    let mut div = 1.0;
    for i in (0..out.len()).rev() {
        out[i].value = out[i].value.map(|v| v * mul / div);
        mul *= steps[i].0;
        div *= steps[i].1;
    }

    Ok(TimeSeries::from_sorted(series.name().to_string(), out))
}

/// Convert prices into another currency using a same-date exchange-rate series.
///
/// `rates` quotes units of the asset's currency per one unit of the target
/// currency, so each price is divided by the rate. A date with no rate (or a
/// missing value on either side) becomes missing.
pub fn convert_currency(series: &TimeSeries, rates: &TimeSeries) -> Result<TimeSeries, ForecastError> {
    if rates.observed().next().is_none() {
        return Err(ForecastError::EmptyInput);
    }
    if let Some((date, rate)) = rates.observed().find(|(_, r)| !(r.is_finite() && *r > 0.0)) {
        return Err(ForecastError::invalid(
            "rates",
            format!("exchange rate must be positive, got {rate} on {date}"),
        ));
    }

    let points = series
        .points()
        .iter()
        .map(|p| Observation {
            date: p.date,
            value: p.value.zip(rates.value_on(p.date)).map(|(v, r)| v / r),
        })
        .collect();

    Ok(TimeSeries::from_sorted(series.name().to_string(), points))
}

/// Full preparation chain applied to freshly loaded data.
pub fn prepare_series(
    raw: &TimeSeries,
    rates: Option<&TimeSeries>,
    config: &PreprocessConfig,
) -> Result<TimeSeries, ForecastError> {
    let adjust = |s: TimeSeries| -> Result<TimeSeries, ForecastError> {
        if config.split_adjust {
            adjust_for_splits(&s, config.thresholds)
        } else {
            Ok(s)
        }
    };

    let mut series = adjust(fill_business_day_gaps(raw)?)?;
    if let Some(rates) = rates {
        let rates = fill_business_day_gaps(rates)?;
        series = adjust(convert_currency(&series, &rates)?)?;
    }
    Ok(series)
}
