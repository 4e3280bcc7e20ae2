//! Analysis window selection for the forecaster.
//!
//! A window policy picks the trailing slice of an ordered observation series
//! that the decline rate is estimated from. The forecaster takes any
//! `WindowSelector`, so callers can plug in their own policy; plain functions
//! `fn(&[Observation]) -> &[Observation]` qualify.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, IsoWeek, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::Observation;

const MS_PER_HOUR: f64 = 3_600_000.0;

pub trait WindowSelector {
    /// Return the slice of `observations` to analyse.
    fn select<'a>(&self, observations: &'a [Observation]) -> &'a [Observation];
}

impl<F> WindowSelector for F
where
    F: for<'a> Fn(&'a [Observation]) -> &'a [Observation],
{
    fn select<'a>(&self, observations: &'a [Observation]) -> &'a [Observation] {
        self(observations)
    }
}

/// Built-in window policies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ForecastWindow {
    /// Every observation.
    All,
    /// Observations in the same ISO week as the newest one.
    #[default]
    LatestIsoWeek,
    /// Observations on the same UTC calendar day as the newest one.
    LatestDay,
    /// Observations no older than this many milliseconds before the newest one.
    Trailing(i64),
}

impl WindowSelector for ForecastWindow {
    fn select<'a>(&self, observations: &'a [Observation]) -> &'a [Observation] {
        let Some(last) = observations.last() else {
            return observations;
        };

        let start = match *self {
            ForecastWindow::All => 0,
            ForecastWindow::LatestIsoWeek => {
                let week = iso_week(last.timestamp);
                suffix_start(observations, |o| iso_week(o.timestamp) == week)
            }
            ForecastWindow::LatestDay => {
                let day = utc_day(last.timestamp);
                suffix_start(observations, |o| utc_day(o.timestamp) == day)
            }
            ForecastWindow::Trailing(ms) => {
                let cutoff = last.timestamp.saturating_sub(ms);
                suffix_start(observations, |o| o.timestamp >= cutoff)
            }
        };
        &observations[start..]
    }
}

/// Start of the longest suffix whose elements all satisfy `keep`.
fn suffix_start(observations: &[Observation], keep: impl Fn(&Observation) -> bool) -> usize {
    observations.iter().rposition(|o| !keep(o)).map_or(0, |i| i + 1)
}

fn iso_week(timestamp: i64) -> Option<IsoWeek> {
    DateTime::from_timestamp_millis(timestamp).map(|dt| dt.iso_week())
}

fn utc_day(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp).map(|dt| dt.date_naive())
}

impl fmt::Display for ForecastWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastWindow::All => f.write_str("all"),
            ForecastWindow::LatestIsoWeek => f.write_str("week"),
            ForecastWindow::LatestDay => f.write_str("day"),
            ForecastWindow::Trailing(ms) => write!(f, "trailing:{}", *ms as f64 / MS_PER_HOUR),
        }
    }
}

impl FromStr for ForecastWindow {
    type Err = String;

    /// Accepts `all`, `week`, `day`, or `trailing:<hours>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "all" => return Ok(ForecastWindow::All),
            "week" => return Ok(ForecastWindow::LatestIsoWeek),
            "day" => return Ok(ForecastWindow::LatestDay),
            _ => {}
        }

        let hours = s
            .strip_prefix("trailing:")
            .ok_or_else(|| format!("Unknown forecast window '{s}'. Expected all, week, day, or trailing:<hours>."))?
            .parse::<f64>()
            .map_err(|e| format!("Invalid trailing window hours in '{s}': {e}"))?;
        if !(hours.is_finite() && hours > 0.0) {
            return Err(format!("Trailing window must be > 0 hours, got {hours}."));
        }
        Ok(ForecastWindow::Trailing((hours * MS_PER_HOUR).round() as i64))
    }
}

impl TryFrom<String> for ForecastWindow {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ForecastWindow> for String {
    fn from(value: ForecastWindow) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3_600_000;
    const DAY: i64 = 24 * HOUR;
    // 2024-01-01 00:00 UTC, a Monday.
    const MONDAY: i64 = 1_704_067_200_000;

    fn obs(timestamps: &[i64]) -> Vec<Observation> {
        timestamps.iter().map(|&t| Observation::new(t, 10.0)).collect()
    }

    #[test]
    fn latest_iso_week_keeps_only_the_last_week() {
        // Sat, Sun of the previous week, then Mon and Wed.
        let series = obs(&[MONDAY - 2 * DAY, MONDAY - DAY, MONDAY, MONDAY + 2 * DAY]);
        let window = ForecastWindow::LatestIsoWeek.select(&series);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].timestamp, MONDAY);
    }

    #[test]
    fn iso_week_spans_year_boundary() {
        // 2024-12-30 (Mon) and 2025-01-01 (Wed) share ISO week 2025-W01.
        let mon = 1_735_516_800_000;
        let series = obs(&[mon - DAY, mon, mon + 2 * DAY]);
        assert_eq!(ForecastWindow::LatestIsoWeek.select(&series).len(), 2);
    }

    #[test]
    fn latest_day_and_trailing() {
        let series = obs(&[MONDAY - HOUR, MONDAY + HOUR, MONDAY + 5 * HOUR]);
        assert_eq!(ForecastWindow::LatestDay.select(&series).len(), 2);
        assert_eq!(ForecastWindow::Trailing(4 * HOUR).select(&series).len(), 2);
        assert_eq!(ForecastWindow::Trailing(HOUR).select(&series).len(), 1);
        assert_eq!(ForecastWindow::All.select(&series).len(), 3);
    }

    #[test]
    fn empty_series_selects_nothing() {
        assert!(ForecastWindow::LatestIsoWeek.select(&[]).is_empty());
    }

    #[test]
    fn functions_are_selectors() {
        fn last_two(o: &[Observation]) -> &[Observation] {
            &o[o.len().saturating_sub(2)..]
        }
        let series = obs(&[1, 2, 3]);
        assert_eq!(last_two.select(&series).len(), 2);
    }

    #[test]
    fn parses_window_names() {
        assert_eq!("week".parse::<ForecastWindow>(), Ok(ForecastWindow::LatestIsoWeek));
        assert_eq!("ALL".parse::<ForecastWindow>(), Ok(ForecastWindow::All));
        assert_eq!("trailing:6".parse::<ForecastWindow>(), Ok(ForecastWindow::Trailing(6 * HOUR)));
        assert!("trailing:-1".parse::<ForecastWindow>().is_err());
        assert!("month".parse::<ForecastWindow>().is_err());
        assert_eq!(ForecastWindow::Trailing(6 * HOUR).to_string(), "trailing:6");
    }
}
