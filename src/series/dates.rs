//! Timestamp parsing for the date column.
//!
//! Spreadsheet exports encode the same column several ways, sometimes within a
//! single sheet. Parsing is an ordered chain of strategies, each a
//! `(predicate, extractor)` pair; the first extractor that yields a timestamp
//! wins, and a strategy that matches but fails to extract falls through to the
//! next one. Adding a format means appending a strategy, not editing a
//! conditional.
//!
//! Default chain:
//! 1. `Date(Y,M,D[,h[,m[,s]]])` spreadsheet literals (zero-based month)
//! 2. `dd.mm.yyyy hh:mm[:ss]`
//! 3. generic formats (RFC 3339, RFC 2822, a few ISO-ish and US layouts)
//!
//! Wall-clock values without an offset are read as UTC so results do not
//! depend on the host time zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::CellValue;

/// Largest magnitude representable as a platform date (±100,000,000 days).
const MAX_EPOCH_MS: f64 = 8.64e15;

/// Generic fallback layouts for naive date-times, tried in order.
const NAIVE_DATETIME_FMTS: [&str; 9] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Generic fallback layouts for bare dates (midnight UTC).
const NAIVE_DATE_FMTS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

pub type DatePredicate = fn(&str) -> bool;
pub type DateExtractor = fn(&str) -> Option<i64>;

/// One parsing strategy in the chain.
#[derive(Clone, Copy)]
pub struct DateStrategy {
    pub name: &'static str,
    pub matches: DatePredicate,
    pub extract: DateExtractor,
}

impl std::fmt::Debug for DateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateStrategy").field("name", &self.name).finish()
    }
}

pub const SHEETS_LITERAL: DateStrategy = DateStrategy {
    name: "sheets-literal",
    matches: is_sheets_literal,
    extract: parse_sheets_literal,
};

pub const DOTTED_DAY_FIRST: DateStrategy = DateStrategy {
    name: "dotted-day-first",
    matches: is_dotted_day_first,
    extract: parse_dotted_day_first,
};

pub const GENERIC: DateStrategy = DateStrategy {
    name: "generic",
    matches: always,
    extract: parse_generic,
};

/// Ordered chain of date strategies.
#[derive(Debug, Clone)]
pub struct DateParser {
    strategies: Vec<DateStrategy>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self {
            strategies: vec![SHEETS_LITERAL, DOTTED_DAY_FIRST, GENERIC],
        }
    }
}

impl DateParser {
    /// A parser with no strategies; everything fails until some are added.
    pub fn empty() -> Self {
        Self { strategies: Vec::new() }
    }

    /// Append a strategy at the end of the chain.
    pub fn with_strategy(mut self, strategy: DateStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies(&self) -> &[DateStrategy] {
        &self.strategies
    }

    /// Parse text into epoch milliseconds.
    pub fn parse_str(&self, raw: &str) -> Option<i64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        self.strategies
            .iter()
            .filter(|s| (s.matches)(raw))
            .find_map(|s| (s.extract)(raw))
    }

    /// Parse a cell into epoch milliseconds.
    ///
    /// Numeric cells are taken as epoch milliseconds already.
    pub fn parse_cell(&self, cell: &CellValue) -> Option<i64> {
        match cell {
            CellValue::Number(n) => epoch_ms_from_number(*n),
            CellValue::Text(s) => self.parse_str(s),
            CellValue::Bool(_) | CellValue::Empty => None,
        }
    }
}

/// Parse a date cell with the default strategy chain.
pub fn try_parse_date(cell: &CellValue) -> Option<i64> {
    DateParser::default().parse_cell(cell)
}

/// `dd.mm hh:mm`, the compact tick label used on charts.
pub fn format_short_label(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp).map(|dt| dt.format("%d.%m %H:%M").to_string())
}

/// `dd.mm.yyyy hh:mm:ss`, the tooltip label.
pub fn format_full_label(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp).map(|dt| dt.format("%d.%m.%Y %H:%M:%S").to_string())
}

fn epoch_ms_from_number(n: f64) -> Option<i64> {
    if !n.is_finite() || n.abs() > MAX_EPOCH_MS {
        return None;
    }
    Some(n.trunc() as i64)
}

fn always(_: &str) -> bool {
    true
}

fn is_sheets_literal(raw: &str) -> bool {
    raw.starts_with("Date(") && raw.ends_with(')')
}

fn parse_sheets_literal(raw: &str) -> Option<i64> {
    let inner = raw.strip_prefix("Date(")?.strip_suffix(')')?;
    let fields: Vec<&str> = inner.split(',').map(str::trim).collect();
    if !(3..=6).contains(&fields.len()) {
        return None;
    }

    let year = fields[0].parse::<i32>().ok()?;
    let month0 = fields[1].parse::<u32>().ok()?;
    let day = fields[2].parse::<u32>().ok()?;
    let field_or_zero = |idx: usize| -> Option<u32> {
        match fields.get(idx) {
            Some(f) => f.parse::<u32>().ok(),
            None => Some(0),
        }
    };
    let hour = field_or_zero(3)?;
    let minute = field_or_zero(4)?;
    let second = field_or_zero(5)?;

    let dt = NaiveDate::from_ymd_opt(year, month0.checked_add(1)?, day)?.and_hms_opt(hour, minute, second)?;
    Some(dt.and_utc().timestamp_millis())
}

fn is_dotted_day_first(raw: &str) -> bool {
    raw.split_whitespace().next().is_some_and(|date| date.contains('.')) && raw.contains(char::is_whitespace)
}

fn parse_dotted_day_first(raw: &str) -> Option<i64> {
    let mut parts = raw.split_whitespace();
    let date = parts.next()?;
    let time = parts.next()?;

    let date_fields: Vec<&str> = date.split('.').collect();
    let [day, month, year] = date_fields.as_slice() else {
        return None;
    };
    let day = day.parse::<u32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    let year = year.parse::<i32>().ok()?;

    let time_fields: Vec<&str> = time.split(':').collect();
    let (hour, minute, second) = match time_fields.as_slice() {
        [h, m] => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?, 0),
        [h, m, s] => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?, s.parse::<u32>().ok()?),
        _ => return None,
    };

    let dt = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    Some(dt.and_utc().timestamp_millis())
}

fn parse_generic(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp_millis());
    }
    for fmt in NAIVE_DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in NAIVE_DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}
