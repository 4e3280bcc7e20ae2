//! Row normalization.
//!
//! Responsibilities:
//!
//! - coerce loosely-typed cells into numbers and timestamps
//! - build sorted `TimePoint` sequences for the configured sensors
//! - narrow them to a relative time range
//! - derive per-sensor observation slices and summary stats

pub mod cells;
pub mod columns;
pub mod dates;
pub mod normalize;
pub mod range;

pub use cells::*;
pub use columns::*;
pub use dates::*;
pub use normalize::*;
pub use range::*;
