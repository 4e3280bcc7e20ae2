//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw spreadsheet input (`CellValue`, `RawRow`)
//! - configuration-facing types (`SensorSpec`, `TimeRange`, `RangeAnchor`)
//! - normalized points and per-sensor observations (`TimePoint`, `Observation`)
//! - forecast outputs (`ForecastResult`, `ForecastStatus`)

pub mod types;

pub use types::*;
