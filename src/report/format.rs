//! Terminal output: series summaries, point tables, forecast advisories.
//!
//! We keep formatting code in one place so:
//! - the normalizer/forecaster stay free of presentation concerns
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{ForecastResult, ForecastStatus, SensorSpec, SeriesStats, TimePoint, TimeRange};
use crate::forecast::{ForecastSettings, SensorForecast};
use crate::series::{NormalizedSeries, format_full_label, format_short_label};

/// Dataset overview: what was read, what was kept, per-sensor coverage.
pub fn format_series_summary(series: &NormalizedSeries, stats: &SeriesStats, range: TimeRange) -> String {
    let mut out = String::new();

    out.push_str("=== soil - sensor series ===\n");
    out.push_str(&format!(
        "Rows: read={} | kept={} | bad timestamp={} | outside range={}\n",
        series.rows_read,
        series.points.len(),
        series.skipped.len(),
        series.rows_out_of_range,
    ));
    out.push_str(&format!("Range: {range}\n"));

    if let (Some(first), Some(last)) = (stats.first_timestamp, stats.last_timestamp) {
        out.push_str(&format!(
            "Span: {} .. {}\n",
            format_full_label(first).unwrap_or_default(),
            format_full_label(last).unwrap_or_default(),
        ));
    }
    if let Some((lo, hi)) = stats.display_range {
        out.push_str(&format!("Display range: [{lo:.2}, {hi:.2}]\n"));
    }

    if !stats.sensors.is_empty() {
        out.push_str("\nSensors:\n");
        for s in &stats.sensors {
            out.push_str(&format!(
                "- {:<20} present={:<5} missing={:<5} min={} max={}\n",
                truncate(&s.name, 20),
                s.present,
                s.missing,
                fmt_opt(s.min, 2),
                fmt_opt(s.max, 2),
            ));
        }
    }

    out
}

/// Table of the newest `limit` points (all points when `limit == 0`).
pub fn format_points_table(points: &[TimePoint], sensors: &[SensorSpec], limit: usize) -> String {
    let columns: Vec<&SensorSpec> = sensors.iter().filter(|s| s.visible).collect();
    let start = if limit == 0 { 0 } else { points.len().saturating_sub(limit) };

    let mut out = String::new();
    let mut header = format!("{:<12}", "time");
    let mut rule = format!("{:-<12}", "");
    for s in &columns {
        header.push_str(&format!(" {:>12}", truncate(&s.name, 12)));
        rule.push_str(&format!(" {:-<12}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for p in &points[start..] {
        let mut line = format!("{:<12}", format_short_label(p.timestamp).unwrap_or_default());
        for s in &columns {
            line.push_str(&format!(" {:>12}", fmt_opt(p.value(&s.column), 2)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if start > 0 {
        out.push_str(&format!("... {start} earlier points not shown\n"));
    }
    out
}

/// Per-sensor forecast table followed by one advisory line per sensor.
pub fn format_forecasts(forecasts: &[SensorForecast], settings: &ForecastSettings) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== soil - depletion forecast (threshold {}, window {}) ===\n",
        settings.threshold, settings.window
    ));
    out.push_str(
        format!(
            "{:<20} {:>8} {:<9} {:>10} {:>10} {:>6}\n",
            "sensor", "latest", "zone", "drop/h", "hours", "n"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!("{:-<20} {:-<8} {:-<9} {:-<10} {:-<10} {:-<6}\n", "", "", "", "", "", ""));

    for f in forecasts {
        let r = &f.result;
        out.push_str(
            format!(
                "{:<20} {:>8} {:<9} {:>10} {:>10} {:>6}\n",
                truncate(&f.name, 20),
                fmt_opt(r.latest_value, 2),
                f.zone.map(|z| z.label()).unwrap_or("-"),
                fmt_opt(r.average_rate_per_hour, 3),
                fmt_opt(r.projected_hours_to_threshold.map(f64::round), 0),
                r.source_point_count,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push('\n');
    for f in forecasts {
        out.push_str(&format!("{}: {}\n", f.name, advisory_text(&f.result)));
    }
    out
}

/// One-line human summary of a forecast.
pub fn advisory_text(result: &ForecastResult) -> String {
    match result.status {
        ForecastStatus::InsufficientData => {
            "no forecast available (fewer than 2 readings in the analysis window)".to_string()
        }
        ForecastStatus::NoDecline => "no forecast available (no decline in the analysis window)".to_string(),
        ForecastStatus::Available => {
            let rate = result.average_rate_per_hour.unwrap_or_default();
            match result.projected_hours_to_threshold {
                Some(h) if h <= 0.0 => format!(
                    "already at or below {} (dropping {rate:.3}/h), watering needed now",
                    result.threshold
                ),
                Some(h) => format!(
                    "~{} h until {} (dropping {rate:.3}/h)",
                    h.round(),
                    result.threshold
                ),
                None => "no forecast available (value is not declining)".to_string(),
            }
        }
    }
}

/// Numbered list of candidate sensor columns.
pub fn format_columns(columns: &[String]) -> String {
    if columns.is_empty() {
        return "No sensor columns found.\n".to_string();
    }
    let mut out = String::from("Available sensor columns:\n");
    for (i, c) in columns.iter().enumerate() {
        out.push_str(&format!("{:>3}. {c}\n", i + 1));
    }
    out
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::forecast::{ForecastWindow, MoistureZone};
    use crate::series::series_stats;

    fn available(rate: f64, hours: f64) -> ForecastResult {
        ForecastResult {
            status: ForecastStatus::Available,
            average_rate_per_hour: Some(rate),
            projected_hours_to_threshold: Some(hours),
            rate_sample_count: 3,
            latest_value: Some(20.0),
            ..ForecastResult::unavailable(ForecastStatus::Available, 18.0, 4)
        }
    }

    #[test]
    fn advisory_rounds_hours_and_rate() {
        assert_eq!(advisory_text(&available(0.12345, 16.4)), "~16 h until 18 (dropping 0.123/h)");
        assert!(advisory_text(&available(1.0, -2.0)).starts_with("already at or below 18"));
        assert!(
            advisory_text(&ForecastResult::unavailable(ForecastStatus::NoDecline, 18.0, 5))
                .contains("no decline")
        );
    }

    #[test]
    fn forecast_table_lists_each_sensor() {
        let forecasts = vec![SensorForecast {
            column: "s1".to_string(),
            name: "Bed A".to_string(),
            result: available(0.5, 4.0),
            zone: Some(MoistureZone::Optimal),
        }];
        let settings = ForecastSettings {
            window: ForecastWindow::LatestIsoWeek,
            ..ForecastSettings::default()
        };
        let text = format_forecasts(&forecasts, &settings);
        assert!(text.contains("window week"));
        assert!(text.contains("optimal"));
        assert!(text.contains("Bed A: ~4 h until 18"));
    }

    #[test]
    fn points_table_shows_newest_rows() {
        let points: Vec<TimePoint> = (0..5)
            .map(|i| TimePoint {
                timestamp: 1_704_067_200_000 + i * 3_600_000,
                raw_label: String::new(),
                values: BTreeMap::from([("s1".to_string(), if i == 4 { None } else { Some(i as f64) })]),
            })
            .collect();
        let text = format_points_table(&points, &[SensorSpec::new("s1")], 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "01.01 03:00          3.00");
        assert_eq!(lines[3], "01.01 04:00             -");
        assert_eq!(lines[4], "... 3 earlier points not shown");
    }

    #[test]
    fn summary_reports_counts() {
        let series = NormalizedSeries {
            points: Vec::new(),
            rows_read: 4,
            skipped: Vec::new(),
            rows_out_of_range: 4,
        };
        let stats = series_stats(&series.points, &[]);
        let text = format_series_summary(&series, &stats, TimeRange::LastDay);
        assert!(text.contains("read=4 | kept=0 | bad timestamp=0 | outside range=4"));
        assert!(text.contains("Range: 1d"));
    }
}
