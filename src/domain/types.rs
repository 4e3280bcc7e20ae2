//! Shared domain types.
//!
//! These types are intentionally plain data so they can be:
//!
//! - built from spreadsheet exports (CSV / JSON rows)
//! - passed between the normalizer and the forecaster
//! - exported to CSV/JSON for downstream charting

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A single loosely-typed spreadsheet cell.
///
/// Spreadsheet backends hand back numbers, strings, booleans, or nothing at
/// all for the same column depending on who typed the value and how it was
/// exported. Coercion into something useful happens later (`series::cells`,
/// `series::dates`), never here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    #[default]
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// One spreadsheet row: column name -> cell.
///
/// Column order is preserved as first seen, since "the first row's columns"
/// is what the column picker offers. Lookups are linear; rows are narrow
/// (a sheet range like `A:Z`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or replace a cell. Replacing keeps the original column position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = RawRow;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping column names to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawRow, A::Error> {
                let mut row = RawRow::new();
                while let Some((column, value)) = map.next_entry::<String, CellValue>()? {
                    row.insert(column, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

// ---------------------------------------------------------------------------
// Configuration-facing types
// ---------------------------------------------------------------------------

/// Chart style hint carried through for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Area,
}

/// A configured sensor: which source column holds its readings.
///
/// Identified by `column`. `name`, `color` and `kind` are display hints only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSpec {
    pub name: String,
    pub column: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, rename = "type")]
    pub kind: ChartKind,
}

fn default_visible() -> bool {
    true
}

impl SensorSpec {
    /// A visible line sensor labelled with its column name.
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            column,
            color: String::new(),
            visible: true,
            kind: ChartKind::Line,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Relative time window for range filtering.
///
/// Windows are resolved against an anchor (by default the newest timestamp
/// in the data, see `RangeAnchor`), never against an implicit wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(from = "String", into = "String")]
pub enum TimeRange {
    #[value(name = "1h")]
    LastHour,
    #[value(name = "6h")]
    LastSixHours,
    #[value(name = "1d")]
    LastDay,
    #[value(name = "7d")]
    LastWeek,
    #[default]
    #[value(name = "all")]
    All,
}

impl TimeRange {
    /// Lenient lookup: unknown or empty keys mean "no filtering".
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "1h" => TimeRange::LastHour,
            "6h" => TimeRange::LastSixHours,
            "1d" => TimeRange::LastDay,
            "7d" => TimeRange::LastWeek,
            _ => TimeRange::All,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            TimeRange::LastHour => "1h",
            TimeRange::LastSixHours => "6h",
            TimeRange::LastDay => "1d",
            TimeRange::LastWeek => "7d",
            TimeRange::All => "all",
        }
    }

    /// Window length in milliseconds; `None` means unbounded.
    pub fn duration_ms(self) -> Option<i64> {
        match self {
            TimeRange::LastHour => Some(3_600_000),
            TimeRange::LastSixHours => Some(6 * 3_600_000),
            TimeRange::LastDay => Some(86_400_000),
            TimeRange::LastWeek => Some(7 * 86_400_000),
            TimeRange::All => None,
        }
    }
}

impl From<String> for TimeRange {
    fn from(value: String) -> Self {
        TimeRange::from_key(&value)
    }
}

impl From<TimeRange> for String {
    fn from(value: TimeRange) -> Self {
        value.key().to_string()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What a relative `TimeRange` is measured back from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeAnchor {
    /// The newest timestamp present in the normalized data.
    #[default]
    Latest,
    /// An explicit "now" (epoch ms) supplied by the caller.
    Now(i64),
}

// ---------------------------------------------------------------------------
// Normalized output
// ---------------------------------------------------------------------------

/// One normalized row.
///
/// `values` holds an entry for every requested (visible) sensor; `None` means
/// the cell was missing, blank or non-numeric. Columns that were not
/// requested have no entry at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    /// Epoch milliseconds (UTC).
    pub timestamp: i64,
    /// The date cell exactly as it appeared in the source.
    pub raw_label: String,
    pub values: BTreeMap<String, Option<f64>>,
}

impl TimePoint {
    /// The numeric value for `column`, if requested and present.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }

    /// `true` when `column` was requested, regardless of whether it had a value.
    pub fn tracks(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

/// A single non-null reading for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: i64,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Per-sensor summary over a normalized series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorStats {
    pub column: String,
    pub name: String,
    pub present: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Summary stats about a normalized series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub n_points: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub sensors: Vec<SensorStats>,
    /// Padded value axis range across all sensors: `(min, max)`.
    pub display_range: Option<(f64, f64)>,
}

// ---------------------------------------------------------------------------
// Forecast output
// ---------------------------------------------------------------------------

/// Why a forecast is (or is not) available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Available,
    /// Fewer than two observations overall or inside the analysis window.
    InsufficientData,
    /// Enough points, but no interval showed a decline.
    NoDecline,
}

/// Depletion forecast for one sensor.
///
/// Sign convention: `average_rate_per_hour > 0` means the value is dropping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub status: ForecastStatus,
    pub average_rate_per_hour: Option<f64>,
    /// Hours until `threshold` is reached. Negative when the latest value is
    /// already below it.
    pub projected_hours_to_threshold: Option<f64>,
    /// Observations inside the analysis window.
    pub source_point_count: usize,
    /// Intervals that contributed a decline rate.
    pub rate_sample_count: usize,
    pub latest_value: Option<f64>,
    pub window_start: Option<i64>,
    pub window_end: Option<i64>,
    pub threshold: f64,
}

impl ForecastResult {
    /// A result that carries no forecast.
    pub fn unavailable(status: ForecastStatus, threshold: f64, source_point_count: usize) -> Self {
        Self {
            status,
            average_rate_per_hour: None,
            projected_hours_to_threshold: None,
            source_point_count,
            rate_sample_count: 0,
            latest_value: None,
            window_start: None,
            window_end: None,
            threshold,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == ForecastStatus::Available
    }
}
