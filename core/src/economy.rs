//! The economic backdrop: growth, demand and sector concurrency,
//! drifting through a four-phase business cycle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EconomicPhase {
    Expansion,
    Peak,
    Contraction,
    Trough,
}

impl EconomicPhase {
    pub fn next(self) -> Self {
        match self {
            Self::Expansion   => Self::Peak,
            Self::Peak        => Self::Contraction,
            Self::Contraction => Self::Trough,
            Self::Trough      => Self::Expansion,
        }
    }

    /// Signed bias applied to the daily growth walk.
    pub fn growth_bias(self) -> f64 {
        match self {
            Self::Expansion   =>  0.5,
            Self::Peak        =>  0.0,
            Self::Contraction => -0.5,
            Self::Trough      => -0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    /// Annualised growth, e.g. 0.02 for 2%.
    pub growth: f64,
    /// Demand index. 1.0 is neutral; it scales customer and order rates.
    pub demand: f64,
    /// Competitive pressure in the sector, 0.0 (monopoly) to 1.0 (saturated).
    pub sector_concurrency: f64,
    pub phase: EconomicPhase,
    /// Virtual days remaining in the current phase.
    pub phase_days_left: u32,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            growth:             0.02,
            demand:             1.0,
            sector_concurrency: 0.5,
            phase:              EconomicPhase::Expansion,
            phase_days_left:    360,
        }
    }
}

impl Economy {
    pub const GROWTH_BOUNDS: (f64, f64) = (-0.10, 0.10);
    pub const DEMAND_BOUNDS: (f64, f64) = (0.2, 3.0);
    pub const CONCURRENCY_BOUNDS: (f64, f64) = (0.0, 1.0);
}
