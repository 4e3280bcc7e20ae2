//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - layers config file, environment and flags
//! - runs the series/forecast pipeline
//! - prints reports and writes optional exports

use chrono::Utc;
use clap::Parser;

use crate::cli::{AnchorArg, ColumnsArgs, Command, ForecastArgs, SensorArg, SeriesArgs, SourceArgs};
use crate::config::DashboardConfig;
use crate::domain::RangeAnchor;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `soil` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    config.apply_process_env()?;

    match cli.command {
        Command::Series(args) => handle_series(args, config),
        Command::Forecast(args) => handle_forecast(args, config),
        Command::Columns(args) => handle_columns(args),
    }
}

fn handle_series(args: SeriesArgs, mut config: DashboardConfig) -> Result<(), AppError> {
    apply_source_args(&mut config, &args.source);

    // The only place the wall clock is read; the library takes it as a value.
    let anchor = match args.anchor {
        AnchorArg::Data => RangeAnchor::Latest,
        AnchorArg::Now => RangeAnchor::Now(Utc::now().timestamp_millis()),
    };
    let run = pipeline::run_series(&args.source.rows, &config, anchor)?;

    println!(
        "{}",
        crate::report::format_series_summary(&run.series, &run.stats, config.time_range)
    );
    println!(
        "{}",
        crate::report::format_points_table(&run.series.points, &run.sensors, args.tail)
    );

    if let Some(path) = &args.export {
        crate::io::export::write_points_csv(path, &run.series.points, &run.sensors)?;
    }
    Ok(())
}

fn handle_forecast(args: ForecastArgs, mut config: DashboardConfig) -> Result<(), AppError> {
    apply_source_args(&mut config, &args.source);
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(window) = args.window {
        config.forecast_window = window;
    }

    let run = pipeline::run_forecast(&args.source.rows, &config)?;
    println!("{}", crate::report::format_forecasts(&run.forecasts, &run.settings));

    if let Some(path) = &args.export {
        crate::io::export::write_forecasts_json(path, &run.forecasts)?;
    }
    Ok(())
}

fn handle_columns(args: ColumnsArgs) -> Result<(), AppError> {
    let ingest = crate::io::ingest::load_rows(&args.rows)?;
    let columns = crate::series::available_columns(&ingest.rows);
    print!("{}", crate::report::format_columns(&columns));
    Ok(())
}

/// CLI flags win over config file and environment.
pub fn apply_source_args(config: &mut DashboardConfig, source: &SourceArgs) {
    if let Some(column) = &source.date_column {
        config.date_column = column.clone();
    }
    if !source.sensors.is_empty() {
        config.sensors = source.sensors.iter().map(|SensorArg(spec)| spec.clone()).collect();
    }
    if let Some(range) = source.range {
        config.time_range = range;
    }
}
