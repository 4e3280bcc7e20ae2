//! Dashboard configuration.
//!
//! Resolution order (later wins):
//! 1. built-in defaults
//! 2. JSON config file (`--config`)
//! 3. `SOIL_*` environment variables (`.env` is honoured)
//! 4. CLI flags (applied by `app`)

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{SensorSpec, TimeRange};
use crate::error::AppError;
use crate::forecast::{DEFAULT_THRESHOLD, ForecastSettings, ForecastWindow, ZoneBounds};
use crate::series::NormalizeConfig;

/// Date column used when none is configured.
pub const DEFAULT_DATE_COLUMN: &str = "ДатаЧас";

pub const ENV_DATE_COLUMN: &str = "SOIL_DATE_COLUMN";
pub const ENV_THRESHOLD: &str = "SOIL_THRESHOLD";
pub const ENV_TIME_RANGE: &str = "SOIL_TIME_RANGE";
pub const ENV_FORECAST_WINDOW: &str = "SOIL_FORECAST_WINDOW";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub date_column: String,
    /// Empty means "every available column".
    pub sensors: Vec<SensorSpec>,
    pub time_range: TimeRange,
    pub threshold: f64,
    pub forecast_window: ForecastWindow,
    pub zones: ZoneBounds,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            sensors: Vec::new(),
            time_range: TimeRange::All,
            threshold: DEFAULT_THRESHOLD,
            forecast_window: ForecastWindow::default(),
            zones: ZoneBounds::default(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::usage(format!("Failed to open config '{}': {e}", path.display())))?;
        serde_json::from_reader(file)
            .map_err(|e| AppError::usage(format!("Invalid config JSON '{}': {e}", path.display())))
    }

    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::usage(format!("Invalid config JSON: {e}")))
    }

    /// Overlay `SOIL_*` variables from the process environment (after `.env`).
    pub fn apply_process_env(&mut self) -> Result<(), AppError> {
        dotenvy::dotenv().ok();
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Overlay `SOIL_*` variables from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(column) = lookup(ENV_DATE_COLUMN).filter(|c| !c.trim().is_empty()) {
            self.date_column = column;
        }
        if let Some(raw) = lookup(ENV_THRESHOLD) {
            self.threshold = raw
                .trim()
                .parse::<f64>()
                .map_err(|e| AppError::usage(format!("Invalid {ENV_THRESHOLD} '{raw}': {e}")))?;
        }
        if let Some(raw) = lookup(ENV_TIME_RANGE) {
            self.time_range = TimeRange::from_key(&raw);
        }
        if let Some(raw) = lookup(ENV_FORECAST_WINDOW) {
            self.forecast_window = raw
                .parse()
                .map_err(|e: String| AppError::usage(format!("Invalid {ENV_FORECAST_WINDOW}: {e}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.date_column.trim().is_empty() {
            return Err(AppError::usage("A date column must be configured."));
        }
        if !self.threshold.is_finite() {
            return Err(AppError::usage(format!("Invalid threshold: {}", self.threshold)));
        }
        if let Some(s) = self.sensors.iter().find(|s| s.column.trim().is_empty()) {
            return Err(AppError::usage(format!("Sensor '{}' has no source column.", s.name)));
        }
        self.zones.validate()
    }

    /// Normalizer input for the given sensor list.
    pub fn normalize_config(&self, sensors: Vec<SensorSpec>) -> NormalizeConfig {
        NormalizeConfig::new(self.date_column.clone(), sensors)
    }

    pub fn forecast_settings(&self) -> ForecastSettings {
        ForecastSettings {
            threshold: self.threshold,
            window: self.forecast_window,
            zones: self.zones,
        }
    }
}
