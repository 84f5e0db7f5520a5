use chrono::{Datelike, Duration, NaiveDate, Weekday};

use probwave::app::pipeline::{prepare_session, run_forecast};
use probwave::domain::{ForecastConfig, MarketSession, ModelKind, PreprocessConfig};
use probwave::io::{read_forecast_json, read_series, write_forecast_json};

const SPLIT_DAY: usize = 45;

/// Weekday closes with a 2:1 split, one skipped holiday and one blank cell.
fn synthetic_csv() -> String {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut csv = String::from("Date,Open,Close\n");
    for i in 0..90usize {
        let date = start + Duration::days(i as i64);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || i == 10 {
            continue;
        }
        if i == 17 {
            csv.push_str(&format!("{date},0,\n"));
            continue;
        }
        let base = 50.0 + 5.0 * (i as f64 / 7.0).sin() + 0.05 * i as f64;
        let close = if i < SPLIT_DAY { 2.0 * base } else { base };
        csv.push_str(&format!("{date},0,{close:.4}\n"));
    }
    csv
}

fn session() -> MarketSession {
    let ingest = read_series(synthetic_csv().as_bytes(), "ACME").unwrap();
    assert!(ingest.row_errors.is_empty());
    prepare_session("ACME", "USD", &ingest.series, None, &PreprocessConfig::default()).unwrap()
}

fn config(model: ModelKind) -> ForecastConfig {
    ForecastConfig {
        model,
        num_days: 15,
        num_simulations: 200,
        num_levels: 4,
        num_sample_paths: 3,
        history_days: 20,
        seed: Some(11),
        ..ForecastConfig::default()
    }
}

#[test]
fn prepared_series_is_gap_filled_and_split_adjusted() {
    let session = session();
    let points = session.series.points();

    assert!(points.iter().all(|p| !matches!(p.date.weekday(), Weekday::Sat | Weekday::Sun)));
    assert!(points.iter().all(|p| p.value.is_some()));
    for w in points.windows(2) {
        assert_eq!(
            w[1].date - w[0].date,
            if w[0].date.weekday() == Weekday::Fri { Duration::days(3) } else { Duration::days(1) }
        );
        let ratio = w[0].value.unwrap() / w[1].value.unwrap();
        assert!(ratio > 0.6 && ratio < 1.8, "unadjusted jump at {}", w[1].date);
    }
}

#[test]
fn forecast_shapes_dates_and_history() {
    let session = session();
    for model in [ModelKind::RandomWalk, ModelKind::MeanReverting] {
        let out = run_forecast(&session, &config(model)).unwrap();

        assert_eq!(out.paths.shape(), (200, 15));
        assert_eq!(out.dates.len(), 15);
        assert!(out.dates[0] > out.anchor.date);
        assert!(out.dates.windows(2).all(|w| w[0] < w[1]));
        assert!(out.dates.iter().all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));

        assert_eq!(Some(out.anchor.date), session.series.last_date());
        assert_eq!(out.training_points, session.series.len());

        assert_eq!(out.fan.bands.len(), 4);
        assert!(out.fan.bands.iter().all(|b| b.lower.len() == 15 && b.upper.len() == 15));
        assert_eq!(out.fan.sample_paths.len(), 3);
        assert_eq!(out.fan.sample_paths[0], out.paths.row(0).to_vec());
        assert!((out.fan.band_opacity - 0.5).abs() < 1e-12);

        assert_eq!(out.history.len(), 20);
        assert_eq!(out.history.last().map(|p| p.date), session.series.last_date());
        assert!(out.paths.as_slice().iter().all(|v| v.is_finite() && *v > 0.0));
    }
}

#[test]
fn seeded_runs_are_reproducible_across_parallelism() {
    let session = session();
    let sequential = run_forecast(&session, &config(ModelKind::RandomWalk)).unwrap();
    let again = run_forecast(&session, &config(ModelKind::RandomWalk)).unwrap();
    let parallel = run_forecast(
        &session,
        &ForecastConfig {
            parallel: true,
            ..config(ModelKind::RandomWalk)
        },
    )
    .unwrap();

    assert_eq!(sequential.paths, again.paths);
    assert_eq!(sequential.paths, parallel.paths);
    assert_eq!(sequential.fan, parallel.fan);
}

#[test]
fn training_window_moves_the_anchor() {
    let session = session();
    let cutoff = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let out = run_forecast(
        &session,
        &ForecastConfig {
            train_until: Some(cutoff),
            ..config(ModelKind::MeanReverting)
        },
    )
    .unwrap();

    assert_eq!(out.anchor.date, cutoff);
    assert_eq!(out.anchor.value, session.series.value_on(cutoff).unwrap());
    assert_eq!(out.training_points, session.series.until(cutoff).len());
    assert!(out.training_points < session.series.len());
    assert_eq!(out.dates[0], NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
}

#[test]
fn forecast_json_round_trips() {
    let out = run_forecast(&session(), &config(ModelKind::MeanReverting)).unwrap();
    let file = out.to_file();

    let path = std::env::temp_dir().join(format!("probwave-forecast-{}.json", std::process::id()));
    write_forecast_json(&path, &file).unwrap();
    let loaded = read_forecast_json(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.model, file.model);
    assert_eq!(loaded.anchor.date, file.anchor.date);
    assert_eq!(loaded.dates, file.dates);
    assert_eq!(loaded.num_simulations, 200);
    assert_eq!(loaded.fan.bands.len(), file.fan.bands.len());
    for (a, b) in loaded.fan.bands.iter().zip(&file.fan.bands) {
        for (x, y) in a.lower.iter().chain(&a.upper).zip(b.lower.iter().chain(&b.upper)) {
            assert!((x - y).abs() <= 1e-9 * y.abs());
        }
    }
    assert_eq!(loaded.history.len(), file.history.len());
}

#[test]
fn empty_and_short_inputs_fail_with_data_exit_code() {
    let empty = read_series("date,close\n".as_bytes(), "x").unwrap();
    let err = prepare_session("x", "USD", &empty.series, None, &PreprocessConfig::default()).unwrap_err();
    assert_eq!(err.exit_code(), 3);

    let one = read_series("date,close\n2024-01-02,10\n".as_bytes(), "x").unwrap();
    let session = prepare_session("x", "USD", &one.series, None, &PreprocessConfig::default()).unwrap();
    let err = run_forecast(&session, &config(ModelKind::RandomWalk)).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}
