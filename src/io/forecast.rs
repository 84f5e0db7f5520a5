//! Read/write forecast JSON files.
//!
//! Forecast JSON is the "portable" representation of one run:
//! - model kind + fitted parameters + anchor
//! - forecast dates, quantile bands and overlay sample paths
//! - a trailing window of observed history to plot alongside
//!
//! The schema is defined by `domain::ForecastFile`. Band and sample values
//! that overflowed are stored as `null` and come back as `NaN`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ForecastFile;
use crate::error::AppError;

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, forecast: &ForecastFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;

    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, forecast)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush forecast JSON: {e}")))
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    let forecast: ForecastFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))?;
    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::ModelKind;
    use crate::fan::aggregate;
    use crate::models::{ForecastModel, MeanRevertingModel, simulate};

    #[test]
    fn explosive_forecast_round_trips() {
        let anchor = crate::domain::Anchor {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            value: 100.0,
        };
        let model = MeanRevertingModel::from_parameters(0.0, 1.5, 1.0, anchor).unwrap();
        let paths = simulate(&model, 250, 50, 1, false).unwrap();
        assert!(paths.as_slice().iter().any(|v| !v.is_finite()));

        let fan = aggregate(&paths, 4, 5, 0.3).unwrap();
        let forecast = ForecastFile {
            tool: "probwave".to_string(),
            asset: "X".to_string(),
            currency: "USD".to_string(),
            model: ModelKind::MeanReverting,
            parameters: model.parameters().unwrap(),
            anchor,
            num_simulations: 50,
            dates: crate::data::business_days_after(anchor.date, 250),
            fan,
            history: vec![],
        };

        let path = std::env::temp_dir().join(format!("probwave-explosive-{}.json", std::process::id()));
        write_forecast_json(&path, &forecast).unwrap();
        let loaded = read_forecast_json(&path);
        std::fs::remove_file(&path).ok();
        let loaded = loaded.unwrap();

        assert_eq!(loaded.dates, forecast.dates);
        assert_eq!(loaded.fan.sample_paths.len(), 5);
        for (a, b) in loaded.fan.bands.iter().zip(&forecast.fan.bands) {
            for (x, y) in a.lower.iter().chain(&a.upper).zip(b.lower.iter().chain(&b.upper)) {
                if y.is_finite() {
                    assert!((x - y).abs() <= 1e-9 * y.abs());
                } else {
                    assert!(x.is_nan());
                }
            }
        }
        // Formatting a reloaded overflowing forecast must not fail either.
        assert!(crate::report::format_forecast(&loaded).contains("Mean reverting"));
    }
}
