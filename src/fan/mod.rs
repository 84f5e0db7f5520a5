//! Fan chart aggregation: quantile bands over simulated paths.
//!
//! For `num_levels = L` the lower-tail probabilities are evenly spaced from
//! `1/L` to `1/2` inclusive (`L = 1` gives the single probability `1/2`), and
//! each band pairs the `q` and `1 - q` quantiles of every forecast day.
//!
//! Conventions:
//! - quantiles use linear interpolation between order statistics
//! - bands are ordered widest first (`q = 1/L`) to innermost (`q = 1/2`), the
//!   order a renderer paints translucent layers in
//! - overlay paths are the first `num_sample_paths` rows, copied verbatim

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{FanBand, FanBands, PathMatrix};
use crate::error::ForecastError;
use crate::math::quantile_sorted;

/// Lower-tail probabilities of the bands, widest first.
pub fn band_probabilities(num_levels: usize) -> Result<Vec<f64>, ForecastError> {
    match num_levels {
        0 => Err(ForecastError::invalid("num_levels", "must be >= 1")),
        1 => Ok(vec![0.5]),
        n => {
            let start = 1.0 / n as f64;
            let step = (0.5 - start) / (n - 1) as f64;
            Ok((0..n).map(|k| start + step * k as f64).collect())
        }
    }
}

/// Summarize a path matrix into quantile bands plus a few raw paths.
pub fn aggregate(
    paths: &PathMatrix,
    num_levels: usize,
    num_sample_paths: usize,
    sample_opacity: f64,
) -> Result<FanBands, ForecastError> {
    let probabilities = band_probabilities(num_levels)?;
    if num_sample_paths > paths.num_simulations() {
        return Err(ForecastError::invalid(
            "num_sample_paths",
            format!(
                "requested {num_sample_paths} sample paths but only {} simulations exist",
                paths.num_simulations()
            ),
        ));
    }
    if !(sample_opacity.is_finite() && (0.0..=1.0).contains(&sample_opacity)) {
        return Err(ForecastError::invalid("sample_opacity", "must be within [0, 1]"));
    }

    // Per day: (lower, upper) for every level.
    let per_day: Vec<Vec<(f64, f64)>> = (0..paths.num_days())
        .into_par_iter()
        .map(|day| {
            let mut column = paths.column(day);
            column.sort_by(f64::total_cmp);
            probabilities
                .iter()
                .map(|&q| {
                    let lower = quantile_sorted(&column, q).unwrap_or(f64::NAN);
                    let upper = quantile_sorted(&column, 1.0 - q).unwrap_or(f64::NAN);
                    (lower, upper)
                })
                .collect()
        })
        .collect();

    let bands = probabilities
        .iter()
        .enumerate()
        .map(|(level, &probability)| FanBand {
            probability,
            lower: per_day.iter().map(|d| d[level].0).collect(),
            upper: per_day.iter().map(|d| d[level].1).collect(),
        })
        .collect();

    let sample_paths = paths
        .rows()
        .take(num_sample_paths)
        .map(<[f64]>::to_vec)
        .collect();

    debug!(
        num_days = paths.num_days(),
        num_simulations = paths.num_simulations(),
        num_levels,
        num_sample_paths,
        "aggregated fan chart"
    );

    Ok(FanBands {
        bands,
        sample_paths,
        band_opacity: (2.0 / num_levels as f64).min(1.0),
        sample_opacity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_matrix(num_simulations: usize, num_days: usize) -> PathMatrix {
        // Row i, day j holds (i + 1) * (j + 1).
        let rows: Vec<Vec<f64>> = (0..num_simulations)
            .map(|i| (0..num_days).map(|j| ((i + 1) * (j + 1)) as f64).collect())
            .collect();
        PathMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn probabilities_are_evenly_spaced_to_median() {
        assert_eq!(band_probabilities(1).unwrap(), vec![0.5]);
        let p = band_probabilities(4).unwrap();
        let expected = [0.25, 1.0 / 3.0, 5.0 / 12.0, 0.5];
        for (a, b) in p.iter().zip(expected) {
            assert!((a - b).abs() < 1e-12, "{a} vs {b}");
        }
        assert!(band_probabilities(0).is_err());
    }

    #[test]
    fn single_level_single_simulation_collapses() {
        let paths = PathMatrix::from_rows(&[vec![3.0, 4.0, 5.0]]).unwrap();
        let fan = aggregate(&paths, 1, 1, 0.3).unwrap();
        assert_eq!(fan.bands.len(), 1);
        let band = &fan.bands[0];
        assert_eq!(band.probability, 0.5);
        assert_eq!(band.lower, vec![3.0, 4.0, 5.0]);
        assert_eq!(band.upper, vec![3.0, 4.0, 5.0]);
        assert_eq!(fan.sample_paths, vec![vec![3.0, 4.0, 5.0]]);
    }

    #[test]
    fn bands_are_nested_and_widest_first() {
        let paths = ramp_matrix(101, 4);
        let fan = aggregate(&paths, 5, 3, 0.3).unwrap();
        assert_eq!(fan.bands.len(), 5);

        for w in fan.bands.windows(2) {
            assert!(w[0].probability < w[1].probability);
            for day in 0..4 {
                assert!(w[0].lower[day] <= w[1].lower[day]);
                assert!(w[0].upper[day] >= w[1].upper[day]);
            }
        }
        // Day 0 values are 1..=101, so the 20% quantile is 21 (h = 20).
        let outer = fan.outermost().unwrap();
        assert!((outer.lower[0] - 21.0).abs() < 1e-9);
        assert!((outer.upper[0] - 81.0).abs() < 1e-9);
        // Innermost band collapses to the median.
        let inner = fan.innermost().unwrap();
        assert!((inner.lower[0] - 51.0).abs() < 1e-9);
        assert!((inner.upper[0] - 51.0).abs() < 1e-9);
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let paths = PathMatrix::from_rows(&[vec![4.0], vec![1.0], vec![3.0], vec![2.0]]).unwrap();
        let fan = aggregate(&paths, 2, 0, 0.0).unwrap();
        // q = 0.5 on 1..4 -> 2.5 (both levels collapse to the median for L = 2).
        assert_eq!(fan.bands[0].lower, vec![2.5]);
        assert_eq!(fan.bands[1].upper, vec![2.5]);
        assert!(fan.sample_paths.is_empty());
    }

    #[test]
    fn sample_paths_are_leading_rows() {
        let paths = ramp_matrix(6, 3);
        let fan = aggregate(&paths, 3, 2, 0.5).unwrap();
        assert_eq!(fan.sample_paths, vec![paths.row(0).to_vec(), paths.row(1).to_vec()]);
        assert_eq!(fan.sample_opacity, 0.5);
        assert!((fan.band_opacity - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_invalid_arguments() {
        let paths = ramp_matrix(3, 2);
        assert!(matches!(
            aggregate(&paths, 0, 1, 0.3).unwrap_err(),
            ForecastError::InvalidArgument { .. }
        ));
        assert!(matches!(
            aggregate(&paths, 2, 4, 0.3).unwrap_err(),
            ForecastError::InvalidArgument { .. }
        ));
        assert!(matches!(
            aggregate(&paths, 2, 1, 1.5).unwrap_err(),
            ForecastError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn input_matrix_is_untouched() {
        let paths = PathMatrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let before = paths.clone();
        aggregate(&paths, 3, 2, 0.3).unwrap();
        assert_eq!(paths, before);
    }
}
