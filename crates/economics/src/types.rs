//! Core types for the Regen allocation engine
//!
//! Monetary amounts are integer coin units (uregen); ratios and weights are
//! plain `f64` fractions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integer coin amount (uregen)
pub type Amount = u64;

/// Default cap on an authority's performance bonus
pub const DEFAULT_BETA_MAX: f64 = 0.15;

/// Tolerance used when checking that routing fractions sum to at most one
pub const FRACTION_EPSILON: f64 = 1e-9;

/// Recipient of a weighted share; immutable for the duration of one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedRecipient {
    pub id: String,
    pub weight: f64,
}

impl WeightedRecipient {
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// Integer payout assigned to a weighted recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientPayout {
    pub id: String,
    pub weight: f64,
    pub payout: Amount,
}

/// Proof-of-authority validator with a performance bonus in `[0, beta_max]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authority {
    pub authority_id: String,
    #[serde(rename = "beta", default)]
    pub bonus_beta: f64,
}

impl Authority {
    pub fn new(authority_id: impl Into<String>, bonus_beta: f64) -> Self {
        Self {
            authority_id: authority_id.into(),
            bonus_beta,
        }
    }
}

/// Fee routing for one epoch of authority compensation.
///
/// Whatever is not routed to validators or burned stays in the community pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Total fees collected in the epoch; negative values are rejected
    pub fee_total: i64,
    /// Share of fees paid to authorities (0..1)
    pub validator_fraction: f64,
    /// Share of fees burned (0..1)
    pub burn_fraction: f64,
    /// Upper bound on any single authority bonus
    #[serde(default = "default_beta_max")]
    pub beta_max: f64,
}

fn default_beta_max() -> f64 {
    DEFAULT_BETA_MAX
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            fee_total: 0,
            validator_fraction: 0.5,
            burn_fraction: 0.2,
            beta_max: DEFAULT_BETA_MAX,
        }
    }
}

/// Per-authority line of an allocation outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityPayout {
    pub authority_id: String,
    pub beta: f64,
    pub weight: f64,
    pub payout: Amount,
}

/// Result of splitting one epoch's fees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub fee_total: Amount,
    pub validator_pool: Amount,
    pub burn_pool: Amount,
    pub community_pool: Amount,
    pub authorities: Vec<AuthorityPayout>,
    pub payout_sum: Amount,
}

/// Expected figures shipped alongside a scenario file for regression checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedOutcome {
    pub validator_pool: Amount,
    pub burn_pool: Amount,
    pub community_pool: Amount,
    #[serde(default)]
    pub payouts_by_authority: BTreeMap<String, Amount>,
}

/// Scenario file: routing config, the authority set and optional expectations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationScenario {
    #[serde(flatten)]
    pub config: AllocationConfig,
    pub authorities: Vec<Authority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<ExpectedOutcome>,
}
