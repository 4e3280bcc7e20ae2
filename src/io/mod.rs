//! Input/output helpers.
//!
//! - row loading from CSV/JSON spreadsheet exports (`ingest`)
//! - point and forecast exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
