//! Moisture zones used for the advisory text.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoistureZone {
    /// Below the critical bound: water now.
    Critical,
    /// Between critical and optimal.
    Warning,
    /// At or above the optimal bound.
    Optimal,
}

impl MoistureZone {
    pub fn label(self) -> &'static str {
        match self {
            MoistureZone::Critical => "critical",
            MoistureZone::Warning => "warning",
            MoistureZone::Optimal => "optimal",
        }
    }
}

/// Zone boundaries: `[0, critical)` critical, `[critical, optimal)` warning,
/// `[optimal, ∞)` optimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBounds {
    #[serde(default = "default_critical")]
    pub critical: f64,
    #[serde(default = "default_optimal")]
    pub optimal: f64,
}

fn default_critical() -> f64 {
    6.0
}

fn default_optimal() -> f64 {
    18.0
}

impl Default for ZoneBounds {
    fn default() -> Self {
        Self {
            critical: default_critical(),
            optimal: default_optimal(),
        }
    }
}

impl ZoneBounds {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.critical.is_finite() && self.optimal.is_finite() && self.critical <= self.optimal) {
            return Err(AppError::usage(format!(
                "Invalid moisture zones: critical={}, optimal={} (must be finite and critical <= optimal).",
                self.critical, self.optimal
            )));
        }
        Ok(())
    }

    pub fn classify(&self, value: f64) -> MoistureZone {
        if value < self.critical {
            MoistureZone::Critical
        } else if value < self.optimal {
            MoistureZone::Warning
        } else {
            MoistureZone::Optimal
        }
    }
}
