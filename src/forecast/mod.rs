//! Depletion forecasting.
//!
//! Responsibilities:
//!
//! - choose the analysis window (`window`)
//! - estimate the average decline rate and hours to threshold (`depletion`)
//! - classify readings into moisture zones (`zones`)

pub mod depletion;
pub mod window;
pub mod zones;

pub use depletion::*;
pub use window::*;
pub use zones::*;
