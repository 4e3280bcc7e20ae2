//! Moisture depletion forecasting.
//!
//! Estimates how fast a reading is falling and when it will cross a
//! threshold:
//!
//! ```text
//! rate_i     = (v[i-1] - v[i]) / hours(t[i] - t[i-1])   for declining, forward-in-time pairs
//! avg_rate   = mean(rate_i)
//! hours_left = (v_latest - threshold) / avg_rate
//! ```
//!
//! Rising, flat, duplicate-timestamp and out-of-order pairs contribute no
//! sample. Positive rates mean decline. Every input yields a well-formed
//! `ForecastResult`; degenerate series just carry no forecast.

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{ForecastResult, ForecastStatus, Observation, SensorSpec, TimePoint};
use crate::forecast::window::{ForecastWindow, WindowSelector};
use crate::forecast::zones::{MoistureZone, ZoneBounds};
use crate::series::columns::sensor_observations;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Moisture level that triggers watering, when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 18.0;

/// Settings for forecasting every visible sensor in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    pub threshold: f64,
    pub window: ForecastWindow,
    pub zones: ZoneBounds,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            window: ForecastWindow::default(),
            zones: ZoneBounds::default(),
        }
    }
}

/// Forecast for one configured sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorForecast {
    pub column: String,
    pub name: String,
    pub result: ForecastResult,
    /// Zone of the latest reading in the window, if any.
    pub zone: Option<MoistureZone>,
}

/// Decline rate (units per hour) between two consecutive observations.
///
/// `None` unless the value dropped and time moved forward.
pub fn decline_rate(prev: &Observation, curr: &Observation) -> Option<f64> {
    let delta_hours = curr.timestamp.saturating_sub(prev.timestamp) as f64 / MS_PER_HOUR;
    let delta_value = prev.value - curr.value;
    (delta_value > 0.0 && delta_hours > 0.0).then(|| delta_value / delta_hours)
}

/// Forecast threshold crossing for an ordered, null-free observation series.
pub fn forecast_depletion<W>(observations: &[Observation], threshold: f64, window: &W) -> ForecastResult
where
    W: WindowSelector + ?Sized,
{
    if observations.len() < 2 {
        return ForecastResult::unavailable(ForecastStatus::InsufficientData, threshold, observations.len());
    }

    let selected = window.select(observations);
    let (Some(first), Some(latest)) = (selected.first(), selected.last()) else {
        return ForecastResult::unavailable(ForecastStatus::InsufficientData, threshold, 0);
    };
    if selected.len() < 2 {
        return ForecastResult {
            latest_value: Some(latest.value),
            window_start: Some(first.timestamp),
            window_end: Some(latest.timestamp),
            ..ForecastResult::unavailable(ForecastStatus::InsufficientData, threshold, selected.len())
        };
    }

    let rates: Vec<f64> = selected
        .windows(2)
        .filter_map(|pair| decline_rate(&pair[0], &pair[1]))
        .collect();

    let base = ForecastResult {
        latest_value: Some(latest.value),
        window_start: Some(first.timestamp),
        window_end: Some(latest.timestamp),
        ..ForecastResult::unavailable(ForecastStatus::NoDecline, threshold, selected.len())
    };
    if rates.is_empty() {
        return base;
    }

    let average = rates.iter().sum::<f64>() / rates.len() as f64;
    let projected = (average > 0.0).then(|| (latest.value - threshold) / average);

    ForecastResult {
        status: ForecastStatus::Available,
        average_rate_per_hour: Some(average),
        projected_hours_to_threshold: projected,
        rate_sample_count: rates.len(),
        ..base
    }
}

/// Forecast over the whole series, without windowing.
pub fn forecast(observations: &[Observation], threshold: f64) -> ForecastResult {
    forecast_depletion(observations, threshold, &ForecastWindow::All)
}

/// Forecast every visible sensor over the normalized points.
///
/// Sensors are independent, so they are evaluated in parallel; output order
/// follows `sensors`.
pub fn forecast_sensors(points: &[TimePoint], sensors: &[SensorSpec], settings: &ForecastSettings) -> Vec<SensorForecast> {
    let visible: Vec<&SensorSpec> = sensors.iter().filter(|s| s.visible).collect();

    visible
        .par_iter()
        .map(|sensor| {
            let observations = sensor_observations(points, &sensor.column);
            let result = forecast_depletion(&observations, settings.threshold, &settings.window);
            let zone = result.latest_value.map(|v| settings.zones.classify(v));
            SensorForecast {
                column: sensor.column.clone(),
                name: sensor.name.clone(),
                result,
                zone,
            }
        })
        .collect()
}
