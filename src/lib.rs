//! `soil-series` library crate.
//!
//! The binary (`soil`) is a thin wrapper around this library so that:
//!
//! - normalization and forecasting are testable without spawning processes
//! - a dashboard front-end can call the same functions the CLI does

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod report;
pub mod series;
