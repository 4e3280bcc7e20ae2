//! Exports for downstream charting.
//!
//! - normalized points -> CSV (one column per visible sensor, blank = missing)
//! - sensor forecasts -> JSON

use std::fs::File;
use std::path::Path;

use crate::domain::{SensorSpec, TimePoint};
use crate::error::AppError;
use crate::forecast::SensorForecast;
use crate::series::format_full_label;

/// Write normalized points to a CSV file.
pub fn write_points_csv(path: &Path, points: &[TimePoint], sensors: &[SensorSpec]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let columns: Vec<&SensorSpec> = sensors.iter().filter(|s| s.visible).collect();

    let mut header = vec!["timestamp".to_string(), "label".to_string(), "raw_label".to_string()];
    header.extend(columns.iter().map(|s| s.column.clone()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::internal(format!("Failed to write export CSV header: {e}")))?;

    for p in points {
        let mut record = vec![
            p.timestamp.to_string(),
            format_full_label(p.timestamp).unwrap_or_default(),
            p.raw_label.clone(),
        ];
        record.extend(columns.iter().map(|s| p.value(&s.column).map(|v| v.to_string()).unwrap_or_default()));
        writer
            .write_record(&record)
            .map_err(|e| AppError::internal(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::internal(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write sensor forecasts to a JSON file.
pub fn write_forecasts_json(path: &Path, forecasts: &[SensorForecast]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create forecast JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, forecasts)
        .map_err(|e| AppError::internal(format!("Failed to write forecast JSON: {e}")))?;
    Ok(())
}
