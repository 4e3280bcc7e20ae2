//! Row normalization: raw spreadsheet rows -> sorted, range-filtered points.
//!
//! Policy:
//! - a row is dropped only when its date cell cannot be parsed
//! - missing / non-numeric sensor cells become `None`, the row is kept
//! - output is stably sorted by timestamp (equal timestamps keep input order)
//! - range filtering narrows the sorted set and never reorders it
//!
//! The only error is a caller contract violation (no date column).

use tracing::{debug, warn};

use crate::domain::{RangeAnchor, RawRow, SensorSpec, TimePoint, TimeRange};
use crate::error::AppError;
use crate::series::cells::try_parse_number;
use crate::series::dates::DateParser;
use crate::series::range::filter_range_at;

/// Which columns to read.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    pub date_column: String,
    pub sensors: Vec<SensorSpec>,
}

impl NormalizeConfig {
    pub fn new(date_column: impl Into<String>, sensors: Vec<SensorSpec>) -> Self {
        Self {
            date_column: date_column.into(),
            sensors,
        }
    }
}

/// A row dropped because its date cell did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// Zero-based index into the input rows.
    pub index: usize,
    pub raw_label: String,
}

/// Normalizer output plus bookkeeping about what was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub points: Vec<TimePoint>,
    pub rows_read: usize,
    pub skipped: Vec<SkippedRow>,
    /// Parsed rows that fell outside the time range.
    pub rows_out_of_range: usize,
}

/// Normalize rows with the default date parser, anchored on the data's own
/// newest timestamp.
pub fn normalize_rows(
    rows: &[RawRow],
    config: &NormalizeConfig,
    range: TimeRange,
) -> Result<Vec<TimePoint>, AppError> {
    let normalizer = Normalizer::new(config)?;
    Ok(normalizer.normalize(rows, range, RangeAnchor::Latest).points)
}

/// Reusable normalizer bound to one configuration.
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    date_column: &'a str,
    sensors: Vec<&'a SensorSpec>,
    parser: DateParser,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a NormalizeConfig) -> Result<Self, AppError> {
        let date_column = config.date_column.trim();
        if date_column.is_empty() {
            return Err(AppError::usage("Normalization requires a date column."));
        }

        Ok(Self {
            date_column,
            sensors: config.sensors.iter().filter(|s| s.visible).collect(),
            parser: DateParser::default(),
        })
    }

    /// Swap in a custom date parser chain.
    pub fn with_parser(mut self, parser: DateParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn normalize(&self, rows: &[RawRow], range: TimeRange, anchor: RangeAnchor) -> NormalizedSeries {
        let mut points = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            match self.normalize_row(row) {
                Some(point) => points.push(point),
                None => {
                    let raw_label = row.get(self.date_column).map(|c| c.to_string()).unwrap_or_default();
                    debug!(index, raw_label = %raw_label, "skipping row with unparseable timestamp");
                    skipped.push(SkippedRow { index, raw_label });
                }
            }
        }

        // `sort_by_key` is stable.
        points.sort_by_key(|p| p.timestamp);

        let parsed = points.len();
        let points = filter_range_at(points, range, anchor);
        let rows_out_of_range = parsed - points.len();

        debug!(
            rows = rows.len(),
            kept = points.len(),
            skipped = skipped.len(),
            out_of_range = rows_out_of_range,
            range = %range,
            "normalized rows"
        );
        if points.is_empty() && !rows.is_empty() {
            warn!(date_column = self.date_column, "no rows survived normalization");
        }

        NormalizedSeries {
            points,
            rows_read: rows.len(),
            skipped,
            rows_out_of_range,
        }
    }

    fn normalize_row(&self, row: &RawRow) -> Option<TimePoint> {
        let date_cell = row.get(self.date_column)?;
        let timestamp = self.parser.parse_cell(date_cell)?;

        let values = self
            .sensors
            .iter()
            .map(|s| (s.column.clone(), row.get(&s.column).and_then(try_parse_number)))
            .collect();

        Some(TimePoint {
            timestamp,
            raw_label: date_cell.to_string(),
            values,
        })
    }
}
