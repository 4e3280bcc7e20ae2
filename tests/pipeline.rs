use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use soil_series::app::pipeline::{run_forecast, run_series, run_series_with_rows};
use soil_series::config::DashboardConfig;
use soil_series::domain::{ForecastStatus, RangeAnchor, SensorSpec, TimeRange};
use soil_series::forecast::ForecastWindow;
use soil_series::io::ingest::load_rows;
use soil_series::series::{NormalizeConfig, normalize_rows};

const S1: &str = "Шпалера 1";
const S2: &str = "Шпалера 2";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn ts(day: u32, hour: u32) -> i64 {
    chrono::NaiveDate::from_ymd_opt(2024, 1, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid fixture date")
        .and_utc()
        .timestamp_millis()
}

#[test]
fn csv_and_json_exports_normalize_identically() {
    let config = DashboardConfig::default();
    let csv = run_series(&fixture("readings.csv"), &config, RangeAnchor::Latest).expect("csv run");
    let json = run_series(&fixture("readings.json"), &config, RangeAnchor::Latest).expect("json run");

    assert_eq!(csv.series.points.len(), 8);
    let csv_ts: Vec<i64> = csv.series.points.iter().map(|p| p.timestamp).collect();
    let json_ts: Vec<i64> = json.series.points.iter().map(|p| p.timestamp).collect();
    assert_eq!(csv_ts, json_ts);
    assert_eq!(csv.series.points[0].timestamp, ts(1, 6));
    assert_eq!(csv.series.points[7].timestamp, ts(9, 6));
    assert_eq!(csv.series.points[7].value(S1), Some(19.0));
}

#[test]
fn unparseable_cells_are_dropped_or_null() {
    let run = run_series(&fixture("readings.csv"), &DashboardConfig::default(), RangeAnchor::Latest)
        .expect("csv run");

    // "not a date" row is absent.
    assert_eq!(run.series.skipped.len(), 1);
    assert_eq!(run.series.skipped[0].raw_label, "not a date");
    assert!(run.series.points.iter().all(|p| p.raw_label != "not a date"));

    // "not a number" is a tracked null, not a missing column.
    let point = run
        .series
        .points
        .iter()
        .find(|p| p.timestamp == ts(2, 18))
        .expect("row at 2024-01-02 18:00");
    assert!(point.tracks(S2));
    assert_eq!(point.value(S2), None);
    assert_eq!(point.value(S1), Some(24.0));
}

#[test]
fn output_is_sorted_regardless_of_row_order() {
    let mut ingest = load_rows(&fixture("readings.csv")).expect("load");
    let config = NormalizeConfig::new("ДатаЧас", vec![SensorSpec::new(S1)]);
    let expected = normalize_rows(&ingest.rows, &config, TimeRange::All).expect("normalize");

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        ingest.rows.shuffle(&mut rng);
        let points = normalize_rows(&ingest.rows, &config, TimeRange::All).expect("normalize");
        assert!(points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(points, expected);
    }
}

#[test]
fn week_range_is_a_suffix_of_all() {
    let ingest = load_rows(&fixture("readings.csv")).expect("load");
    let all = run_series_with_rows(ingest.clone(), &DashboardConfig::default(), RangeAnchor::Latest)
        .expect("all run");
    let week_cfg = DashboardConfig {
        time_range: TimeRange::LastWeek,
        ..DashboardConfig::default()
    };
    let week = run_series_with_rows(ingest, &week_cfg, RangeAnchor::Latest).expect("week run");

    assert!(week.series.points.len() < all.series.points.len());
    let offset = all.series.points.len() - week.series.points.len();
    assert_eq!(&all.series.points[offset..], week.series.points.as_slice());
    assert!(week.series.points.iter().all(|p| p.timestamp >= ts(2, 6)));
    assert_eq!(week.series.rows_out_of_range, offset);
}

#[test]
fn now_anchor_far_in_the_future_keeps_nothing() {
    let cfg = DashboardConfig {
        time_range: TimeRange::LastDay,
        ..DashboardConfig::default()
    };
    let run = run_series(&fixture("readings.csv"), &cfg, RangeAnchor::Now(ts(31, 0))).expect("run");
    assert!(run.series.points.is_empty());
    assert_eq!(run.series.rows_out_of_range, 8);
}

#[test]
fn forecast_on_latest_iso_week() {
    let run = run_forecast(&fixture("readings.csv"), &DashboardConfig::default()).expect("forecast");
    assert_eq!(run.settings.window, ForecastWindow::LatestIsoWeek);
    assert_eq!(run.forecasts.len(), 2);

    // Week 2 of 2024: 21 -> 20 -> 19, one unit per 12 h.
    let s1 = &run.forecasts[0];
    assert_eq!(s1.column, S1);
    assert_eq!(s1.result.status, ForecastStatus::Available);
    assert_eq!(s1.result.source_point_count, 3);
    assert_eq!(s1.result.rate_sample_count, 2);
    let rate = s1.result.average_rate_per_hour.expect("rate");
    assert!((rate - 1.0 / 12.0).abs() < 1e-12);
    let hours = s1.result.projected_hours_to_threshold.expect("hours");
    assert!((hours - 12.0).abs() < 1e-9);
    assert_eq!(s1.result.window_start, Some(ts(8, 6)));

    // 44 -> 45 -> 44: only the last step declines.
    let s2 = &run.forecasts[1];
    assert_eq!(s2.result.rate_sample_count, 1);
    let hours = s2.result.projected_hours_to_threshold.expect("hours");
    assert!((hours - 312.0).abs() < 1e-9);
}

#[test]
fn forecast_window_and_threshold_overrides() {
    let cfg = DashboardConfig {
        sensors: vec![SensorSpec::new(S2)],
        forecast_window: ForecastWindow::Trailing(12 * 3_600_000),
        ..DashboardConfig::default()
    };
    // Trailing 12 h ends at 2024-01-09 06:00: 45 -> 44 still declines.
    let run = run_forecast(&fixture("readings.json"), &cfg).expect("forecast");
    assert_eq!(run.forecasts[0].result.status, ForecastStatus::Available);

    let cfg = DashboardConfig {
        sensors: vec![SensorSpec::new(S2)],
        time_range: TimeRange::LastWeek,
        forecast_window: ForecastWindow::All,
        threshold: 50.0,
        ..DashboardConfig::default()
    };
    let run = run_forecast(&fixture("readings.json"), &cfg).expect("forecast");
    let hours = run.forecasts[0].result.projected_hours_to_threshold.expect("hours");
    assert!(hours < 0.0, "already below threshold: {hours}");
}
