//! CSV exports.
//!
//! The exports are meant to be easy to consume in spreadsheets or by an
//! external plotting script:
//! - fan bands in long format, one row per (level, day)
//! - a cleaned series, one row per date

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{FanBands, TimeSeries};
use crate::error::AppError;

/// Write fan bands to a CSV file.
pub fn write_bands_csv(path: &Path, dates: &[NaiveDate], fan: &FanBands) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_bands(&mut out, dates, fan)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

/// Write fan bands as CSV to any writer.
pub fn write_bands<W: Write>(out: &mut W, dates: &[NaiveDate], fan: &FanBands) -> Result<(), AppError> {
    writeln!(out, "level,q_lower,q_upper,day,date,lower,upper")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (level, band) in fan.bands.iter().enumerate() {
        for (day, (lower, upper)) in band.lower.iter().zip(&band.upper).enumerate() {
            let date = dates.get(day).map(|d| d.to_string()).unwrap_or_default();
            writeln!(
                out,
                "{},{:.6},{:.6},{},{},{:.6},{:.6}",
                level,
                band.probability,
                1.0 - band.probability,
                day,
                date,
                lower,
                upper,
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }
    Ok(())
}

/// Write a series to a CSV file (`date,value`; missing values left blank).
pub fn write_series_csv(path: &Path, series: &TimeSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create series CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_series(&mut out, series)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush series CSV: {e}")))
}

/// Write a series as CSV to any writer.
pub fn write_series<W: Write>(out: &mut W, series: &TimeSeries) -> Result<(), AppError> {
    writeln!(out, "date,value")
        .map_err(|e| AppError::new(2, format!("Failed to write series CSV header: {e}")))?;
    for p in series.points() {
        let value = p.value.map(|v| format!("{v:.10}")).unwrap_or_default();
        writeln!(out, "{},{}", p.date, value)
            .map_err(|e| AppError::new(2, format!("Failed to write series CSV row: {e}")))?;
    }
    Ok(())
}
