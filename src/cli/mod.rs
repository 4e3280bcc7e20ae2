//! Command-line parsing for the soil sensor dashboard core.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the normalization/forecasting code.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::domain::{SensorSpec, TimeRange};
use crate::forecast::ForecastWindow;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "soil", version, about = "Soil-moisture sensor series and depletion forecasts")]
pub struct Cli {
    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Dashboard config JSON (date column, sensors, threshold, ...).
    #[arg(long, global = true, value_name = "JSON")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize rows into a sorted time series and print it.
    Series(SeriesArgs),
    /// Forecast hours until each sensor falls to the threshold.
    Forecast(ForecastArgs),
    /// List columns that can be configured as sensors.
    Columns(ColumnsArgs),
}

/// Where rows come from and which columns to read.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Rows exported from the spreadsheet (`.csv`, or `.json`).
    #[arg(value_name = "ROWS")]
    pub rows: PathBuf,

    /// Column holding the timestamp.
    #[arg(long)]
    pub date_column: Option<String>,

    /// Sensor column, optionally labelled (`COLUMN` or `COLUMN=NAME`). Repeatable;
    /// replaces the configured sensors.
    #[arg(long = "sensor", value_name = "COLUMN[=NAME]")]
    pub sensors: Vec<SensorArg>,

    /// Relative time range, measured back from the anchor.
    #[arg(long, value_enum)]
    pub range: Option<TimeRange>,
}

#[derive(Debug, Parser, Clone)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// What the time range is measured back from.
    #[arg(long, value_enum, default_value_t = AnchorArg::Data)]
    pub anchor: AnchorArg,

    /// Show only the newest N points (0 = all).
    #[arg(long, default_value_t = 20)]
    pub tail: usize,

    /// Export normalized points to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Moisture level to forecast the crossing of.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Analysis window: all, week, day, or trailing:<hours>.
    #[arg(long)]
    pub window: Option<ForecastWindow>,

    /// Export forecasts to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ColumnsArgs {
    /// Rows exported from the spreadsheet (`.csv`, or `.json`).
    #[arg(value_name = "ROWS")]
    pub rows: PathBuf,
}

/// Range anchor as exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnchorArg {
    /// Newest timestamp in the data.
    Data,
    /// Current wall-clock time.
    Now,
}

/// `COLUMN` or `COLUMN=NAME`.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorArg(pub SensorSpec);

impl FromStr for SensorArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, name) = match s.split_once('=') {
            Some((column, name)) => (column.trim(), Some(name.trim())),
            None => (s.trim(), None),
        };
        if column.is_empty() {
            return Err(format!("Invalid sensor '{s}': column is empty."));
        }
        let spec = SensorSpec::new(column);
        Ok(SensorArg(match name.filter(|n| !n.is_empty()) {
            Some(name) => spec.named(name),
            None => spec,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_arg_forms() {
        let SensorArg(spec) = "s1".parse().unwrap();
        assert_eq!((spec.column.as_str(), spec.name.as_str()), ("s1", "s1"));

        let SensorArg(spec) = "Шпалера = Bed A".parse().unwrap();
        assert_eq!((spec.column.as_str(), spec.name.as_str()), ("Шпалера", "Bed A"));

        assert!("=x".parse::<SensorArg>().is_err());
    }

    #[test]
    fn parses_forecast_command() {
        let cli = Cli::try_parse_from([
            "soil", "-vv", "forecast", "rows.csv", "--sensor", "s1", "--sensor", "s2=Bed B", "--threshold", "20",
            "--window", "trailing:6", "--range", "7d",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast command");
        };
        assert_eq!(args.source.sensors.len(), 2);
        assert_eq!(args.threshold, Some(20.0));
        assert_eq!(args.window, Some(ForecastWindow::Trailing(6 * 3_600_000)));
        assert_eq!(args.source.range, Some(TimeRange::LastWeek));
    }

    #[test]
    fn series_defaults() {
        let cli = Cli::try_parse_from(["soil", "series", "rows.json"]).unwrap();
        let Command::Series(args) = cli.command else {
            panic!("expected series command");
        };
        assert_eq!(args.anchor, AnchorArg::Data);
        assert_eq!(args.tail, 20);
        assert_eq!(args.source.range, None);
    }
}
