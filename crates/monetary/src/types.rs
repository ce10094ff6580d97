//! Core types for the dynamic supply model

use serde::{Deserialize, Serialize};

/// Epoch index (one epoch ≈ one week)
pub type EpochIndex = u64;

/// Burn (`alpha`) and mint (`beta`) elasticity gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    /// Burn elasticity: share of validator surplus burned
    pub alpha: f64,
    /// Mint elasticity: share of validator deficit minted
    pub beta: f64,
}

impl PolicyParams {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            beta: 1.0,
        }
    }
}

/// Closed interval `[min, max]` for a single gain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub min: f64,
    pub max: f64,
}

impl ParamBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Saturate into the interval; NaN collapses to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Bounds for both gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainBounds {
    pub alpha: ParamBounds,
    pub beta: ParamBounds,
}

impl GainBounds {
    pub fn clamp(&self, params: PolicyParams) -> PolicyParams {
        PolicyParams {
            alpha: self.alpha.clamp(params.alpha),
            beta: self.beta.clamp(params.beta),
        }
    }

    pub fn contains(&self, params: PolicyParams) -> bool {
        self.alpha.contains(params.alpha) && self.beta.contains(params.beta)
    }
}

impl Default for GainBounds {
    fn default() -> Self {
        Self {
            alpha: ParamBounds::new(0.4, 1.0),
            beta: ParamBounds::new(0.8, 1.2),
        }
    }
}

/// Running state threaded through the epoch loop by value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochState {
    pub supply: f64,
    pub fund: f64,
    pub params: PolicyParams,
}

/// Where an epoch's ecological index came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcoSource {
    /// Seeded synthetic generator
    Synthetic,
    /// External feed answered
    Live,
    /// External feed failed; synthetic value substituted
    Fallback,
    /// Caller-supplied static trace
    Replayed,
}

/// Output of one supply governor call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovernorStep {
    pub new_supply: f64,
    pub burn: f64,
    pub mint: f64,
}

/// Immutable per-epoch snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: EpochIndex,
    pub fees: f64,
    pub eco_index: f64,
    pub eco_source: EcoSource,
    pub mint: f64,
    pub burn: f64,
    pub supply: f64,
    pub fund: f64,
    pub inflation_rate: f64,
    /// Gains after this epoch's controller update
    pub alpha: f64,
    pub beta: f64,
}

impl EpochRecord {
    pub fn params(&self) -> PolicyParams {
        PolicyParams::new(self.alpha, self.beta)
    }

    /// Supply as a fraction of the hard cap
    pub fn supply_ratio(&self, supply_cap: f64) -> f64 {
        if supply_cap <= 0.0 {
            return 0.0;
        }
        self.supply / supply_cap
    }

    /// Burned amount per unit of fees; zero-fee epochs report 0
    pub fn burn_per_fee(&self) -> f64 {
        if self.fees == 0.0 {
            return 0.0;
        }
        self.burn / self.fees
    }
}
