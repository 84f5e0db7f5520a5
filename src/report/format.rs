//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the modeling code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::ForecastOutput;
use crate::domain::{ForecastFile, ModelParameters};
use crate::report::checkpoint_days;

/// Format the full run summary (parameters + band table).
pub fn format_run_summary(output: &ForecastOutput) -> String {
    let mut out = format_forecast(&output.to_file());
    out.push_str(&format!("Training points: {}\n", output.training_points));
    out
}

/// Format a forecast, either freshly computed or loaded from JSON.
pub fn format_forecast(file: &ForecastFile) -> String {
    let mut out = String::new();

    out.push_str("=== probwave - Fan Chart Forecast ===\n");
    out.push_str(&format!("Asset: {} ({})\n", file.asset, file.currency));
    out.push_str(&format!("Model: {}\n", file.model.display_name()));
    out.push_str(&format!("Parameters: {}\n", format_parameters(&file.parameters)));
    out.push_str(&format!(
        "Anchor: {} @ {:.4}\n",
        file.anchor.date, file.anchor.value
    ));
    out.push_str(&format!(
        "Simulations: {} | horizon: {} business days | bands: {}\n",
        file.num_simulations,
        file.dates.len(),
        file.fan.bands.len()
    ));

    out.push('\n');
    out.push_str(&format_band_table(file));
    out
}

/// One-line description of fitted parameters.
pub fn format_parameters(params: &ModelParameters) -> String {
    match params {
        ModelParameters::RandomWalk { mu, sigma } => {
            format!("mu={mu:.6} sigma={sigma:.6}")
        }
        ModelParameters::MeanReverting { drift, phi, epsilon } => {
            format!("drift={drift:.6} phi={phi:.6} epsilon={epsilon:.6}")
        }
    }
}

fn format_band_table(file: &ForecastFile) -> String {
    let mut out = String::new();
    let (Some(outer), Some(inner)) = (file.fan.outermost(), file.fan.innermost()) else {
        return out;
    };

    let lo_label = format!("q{:.0}", outer.probability * 100.0);
    let hi_label = format!("q{:.0}", (1.0 - outer.probability) * 100.0);

    out.push_str(
        format!(
            "{:>5} {:<10} {:>12} {:>12} {:>12}\n",
            "day", "date", lo_label, "median", hi_label
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<5} {:-<10} {:-<12} {:-<12} {:-<12}", "", "", "", "", "").trim_end());
    out.push('\n');

    let num_days = [
        file.dates.len(),
        outer.lower.len(),
        outer.upper.len(),
        inner.lower.len(),
    ]
    .into_iter()
    .min()
    .unwrap_or(0);
    for day in checkpoint_days(num_days) {
        out.push_str(
            format!(
                "{:>5} {:<10} {:>12.4} {:>12.4} {:>12.4}",
                day + 1,
                file.dates[day],
                outer.lower[day],
                inner.lower[day],
                outer.upper[day],
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}
