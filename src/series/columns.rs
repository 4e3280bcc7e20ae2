//! Column discovery and per-sensor views over normalized points.

use crate::domain::{Observation, RawRow, SensorSpec, SensorStats, SeriesStats, TimePoint};

/// Column names that conventionally hold the timestamp and are never offered
/// as sensors.
pub const DATE_COLUMN_NAMES: [&str; 5] = ["ДатаЧас", "Date", "Timestamp", "date", "timestamp"];

/// Fraction of the value span added above and below the display range.
const DISPLAY_PADDING: f64 = 0.1;

/// Candidate sensor columns: the first row's columns minus blank names and
/// well-known date columns.
pub fn available_columns(rows: &[RawRow]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .columns()
        .filter(|c| !c.trim().is_empty() && !DATE_COLUMN_NAMES.contains(c))
        .map(str::to_string)
        .collect()
}

/// Non-null readings for one sensor, in point order.
pub fn sensor_observations(points: &[TimePoint], column: &str) -> Vec<Observation> {
    points
        .iter()
        .filter_map(|p| p.value(column).map(|v| Observation::new(p.timestamp, v)))
        .collect()
}

/// Summary stats for the visible sensors over `points`.
pub fn series_stats(points: &[TimePoint], sensors: &[SensorSpec]) -> SeriesStats {
    let sensors: Vec<SensorStats> = sensors
        .iter()
        .filter(|s| s.visible)
        .map(|s| sensor_stats(points, s))
        .collect();

    let overall_min = sensors.iter().filter_map(|s| s.min).reduce(f64::min);
    let overall_max = sensors.iter().filter_map(|s| s.max).reduce(f64::max);
    let display_range = match (overall_min, overall_max) {
        (Some(min), Some(max)) => Some(padded_range(min, max)),
        _ => None,
    };

    SeriesStats {
        n_points: points.len(),
        first_timestamp: points.first().map(|p| p.timestamp),
        last_timestamp: points.last().map(|p| p.timestamp),
        sensors,
        display_range,
    }
}

fn sensor_stats(points: &[TimePoint], sensor: &SensorSpec) -> SensorStats {
    let mut present = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for v in points.iter().filter_map(|p| p.value(&sensor.column)) {
        present += 1;
        min = min.min(v);
        max = max.max(v);
    }

    SensorStats {
        column: sensor.column.clone(),
        name: sensor.name.clone(),
        present,
        missing: points.len() - present,
        min: (present > 0).then_some(min),
        max: (present > 0).then_some(max),
    }
}

/// Pad by 10% of the span on both sides; the lower bound never goes below 0.
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let pad = (max - min) * DISPLAY_PADDING;
    ((min - pad).max(0.0), max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn point(timestamp: i64, values: &[(&str, Option<f64>)]) -> TimePoint {
        TimePoint {
            timestamp,
            raw_label: String::new(),
            values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn available_columns_skip_date_like_and_blank_names() {
        let rows = vec![
            RawRow::new()
                .with("ДатаЧас", "05.03.2024 10:00")
                .with("Шпалера", "20")
                .with("", "x")
                .with("timestamp", "1")
                .with("Bed B", "21"),
            RawRow::new().with("other", "1"),
        ];
        assert_eq!(available_columns(&rows), vec!["Шпалера".to_string(), "Bed B".to_string()]);
        assert!(available_columns(&[]).is_empty());
    }

    #[test]
    fn observations_drop_nulls() {
        let points = vec![
            point(1, &[("s1", Some(20.0))]),
            point(2, &[("s1", None)]),
            point(3, &[("s2", Some(5.0))]),
            point(4, &[("s1", Some(18.0))]),
        ];
        let obs = sensor_observations(&points, "s1");
        assert_eq!(obs, vec![Observation::new(1, 20.0), Observation::new(4, 18.0)]);
    }

    #[test]
    fn stats_count_missing_and_pad_range() {
        let points = vec![
            point(10, &[("s1", Some(10.0)), ("s2", None)]),
            point(20, &[("s1", Some(20.0)), ("s2", Some(15.0))]),
            point(30, &[("s1", None), ("s2", Some(12.0))]),
        ];
        let sensors = vec![SensorSpec::new("s1"), SensorSpec::new("s2"), SensorSpec::new("s3").hidden()];
        let stats = series_stats(&points, &sensors);

        assert_eq!(stats.n_points, 3);
        assert_eq!(stats.first_timestamp, Some(10));
        assert_eq!(stats.last_timestamp, Some(30));
        assert_eq!(stats.sensors.len(), 2);
        assert_eq!(stats.sensors[0].present, 2);
        assert_eq!(stats.sensors[0].missing, 1);
        assert_eq!(stats.sensors[1].min, Some(12.0));

        let (lo, hi) = stats.display_range.unwrap();
        assert!((lo - 9.0).abs() < 1e-12);
        assert!((hi - 21.0).abs() < 1e-12);
    }

    #[test]
    fn display_range_is_clamped_at_zero() {
        let points = vec![point(1, &[("s1", Some(0.5))]), point(2, &[("s1", Some(20.5))])];
        let stats = series_stats(&points, &[SensorSpec::new("s1")]);
        let (lo, _) = stats.display_range.unwrap();
        assert_eq!(lo, 0.0);
    }

    #[test]
    fn stats_for_all_null_sensor() {
        let points = vec![point(1, &[("s1", None)])];
        let stats = series_stats(&points, &[SensorSpec::new("s1")]);
        assert_eq!(stats.sensors[0].min, None);
        assert_eq!(stats.display_range, None);
    }
}
