//! CSV ingest of dated price series.
//!
//! Expected schema: a header row with a `date` column and one value column,
//! the first present of `close`, `adj_close`, `price`, `value` (case
//! insensitive). Blank or `NaN` cells are kept as missing observations so the
//! preprocessor can forward-fill them.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (rows are sorted by date; duplicates are an error)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::warn;

use crate::domain::{Observation, TimeSeries};
use crate::error::AppError;

/// Value column names, in order of preference.
const VALUE_COLUMNS: [&str; 4] = ["close", "adj_close", "price", "value"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the parsed series plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub series: TimeSeries,
    pub value_column: String,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a price CSV from disk. The series is named after the file stem.
pub fn load_series(path: &Path) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    read_series(file, &name)
}

/// Parse a price CSV from any reader.
pub fn read_series<R: Read>(reader: R, name: &str) -> Result<IngestedSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| AppError::new(2, "Missing required column: `date`"))?;
    let (value_column, value_idx) = VALUE_COLUMNS
        .iter()
        .find_map(|c| header_map.get(*c).map(|idx| (c.to_string(), *idx)))
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Missing value column: expected one of {}", VALUE_COLUMNS.join(", ")),
            )
        })?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, value_idx) {
            Ok(obs) => points.push(obs),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), rows_read, "skipped invalid CSV rows");
    }

    points.sort_by_key(|p| p.date);
    if let Some(w) = points.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(AppError::new(2, format!("Duplicate date in CSV: {}", w[0].date)));
    }

    let series = TimeSeries::new(name, points).map_err(|e| AppError::new(2, e.to_string()))?;
    Ok(IngestedSeries {
        series,
        value_column,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase().replace([' ', '-'], "_")
}

fn parse_row(record: &StringRecord, date_idx: usize, value_idx: usize) -> Result<Observation, String> {
    let raw_date = record
        .get(date_idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing required value: `date`".to_string())?;
    let date = parse_date(raw_date)?;

    let raw_value = record.get(value_idx).map(str::trim).unwrap_or_default();
    let value = parse_value(raw_value)?;

    Ok(Observation { date, value })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Some market data exports carry a time component (`2024-01-02 00:00:00`).
    let day = s.split([' ', 'T']).next().unwrap_or(s);
    const FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(day, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

fn parse_value(s: &str) -> Result<Option<f64>, String> {
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid value '{s}'."))?;
    if v.is_finite() { Ok(Some(v)) } else { Ok(None) }
}
