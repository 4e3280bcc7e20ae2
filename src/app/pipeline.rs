//! Shared "rows -> series -> forecast" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load rows -> resolve sensors -> normalize + range filter -> stats -> forecasts
//!
//! The front-end can then focus on presentation.

use std::path::Path;

use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::domain::{RangeAnchor, RawRow, SensorSpec, SeriesStats};
use crate::error::AppError;
use crate::forecast::{ForecastSettings, SensorForecast, forecast_sensors};
use crate::io::ingest::{IngestedRows, load_rows};
use crate::series::{NormalizedSeries, Normalizer, available_columns, series_stats};

/// All computed outputs of a `soil series` run.
#[derive(Debug, Clone)]
pub struct SeriesRun {
    pub ingest: IngestedRows,
    pub sensors: Vec<SensorSpec>,
    pub series: NormalizedSeries,
    pub stats: SeriesStats,
}

/// All computed outputs of a `soil forecast` run.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub series: SeriesRun,
    pub settings: ForecastSettings,
    pub forecasts: Vec<SensorForecast>,
}

/// Load `rows_path` and normalize it per `config`.
pub fn run_series(rows_path: &Path, config: &DashboardConfig, anchor: RangeAnchor) -> Result<SeriesRun, AppError> {
    let ingest = load_rows(rows_path)?;
    run_series_with_rows(ingest, config, anchor)
}

/// Normalize already-loaded rows.
pub fn run_series_with_rows(
    ingest: IngestedRows,
    config: &DashboardConfig,
    anchor: RangeAnchor,
) -> Result<SeriesRun, AppError> {
    config.validate()?;
    if ingest.rows.is_empty() {
        return Err(AppError::no_data("No rows to normalize."));
    }

    let sensors = resolve_sensors(config, &ingest.rows);
    debug!(sensors = sensors.len(), "resolved sensors");

    let normalize = config.normalize_config(sensors.clone());
    let series = Normalizer::new(&normalize)?.normalize(&ingest.rows, config.time_range, anchor);

    if series.points.is_empty() && series.rows_out_of_range == 0 {
        return Err(AppError::no_data(format!(
            "No row has a parseable timestamp in column '{}'.",
            config.date_column
        )));
    }

    let stats = series_stats(&series.points, &sensors);
    info!(
        points = series.points.len(),
        skipped = series.skipped.len(),
        out_of_range = series.rows_out_of_range,
        "normalized series"
    );

    Ok(SeriesRun {
        ingest,
        sensors,
        series,
        stats,
    })
}

/// Normalize `rows_path` and forecast every visible sensor.
///
/// The range is anchored on the data so forecasts are reproducible.
pub fn run_forecast(rows_path: &Path, config: &DashboardConfig) -> Result<ForecastRun, AppError> {
    let ingest = load_rows(rows_path)?;
    run_forecast_with_rows(ingest, config)
}

pub fn run_forecast_with_rows(ingest: IngestedRows, config: &DashboardConfig) -> Result<ForecastRun, AppError> {
    let series = run_series_with_rows(ingest, config, RangeAnchor::Latest)?;
    let settings = config.forecast_settings();
    let forecasts = forecast_sensors(&series.series.points, &series.sensors, &settings);

    Ok(ForecastRun {
        series,
        settings,
        forecasts,
    })
}

/// Configured sensors, or every available non-date column when none are.
pub fn resolve_sensors(config: &DashboardConfig, rows: &[RawRow]) -> Vec<SensorSpec> {
    if !config.sensors.is_empty() {
        return config.sensors.clone();
    }
    available_columns(rows)
        .into_iter()
        .filter(|c| *c != config.date_column)
        .map(SensorSpec::new)
        .collect()
}
