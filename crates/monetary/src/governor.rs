//! Supply governor
//!
//! Routes one epoch of fees, mints to cover the validator deficit scaled by
//! `beta`, burns the eco-weighted fee share plus `alpha` of any validator
//! surplus, and saturates the result at the supply cap.

use crate::config::SimulationConfig;
use crate::types::{GovernorStep, PolicyParams};

/// Ecological modifier applied to the burn path; 1 when coupling is off
pub fn eco_modifier(eco_index: f64, config: &SimulationConfig) -> f64 {
    if config.ecology.enabled {
        1.0 + config.ecology.impact_scale * (eco_index - 1.0)
    } else {
        1.0
    }
}

/// Fee share routed to validators
pub fn validator_fee(fees: f64, config: &SimulationConfig) -> f64 {
    fees * config.routing.validator_ratio
}

/// Compute one epoch of mint and burn. Pure; never fails.
pub fn step(
    fees: f64,
    supply: f64,
    params: PolicyParams,
    eco_index: f64,
    config: &SimulationConfig,
) -> GovernorStep {
    let eco_mod = eco_modifier(eco_index, config);
    let cost = config.supply.validator_cost;

    let burn_fee = fees * config.routing.burn_ratio * eco_mod;
    let validator_fee = validator_fee(fees, config);

    let deficit = (cost - validator_fee).max(0.0);
    let surplus = (validator_fee - cost).max(0.0);

    let mint = params.beta * deficit;
    let burn_extra = params.alpha * eco_mod * surplus;
    let burn = burn_fee + burn_extra;

    let new_supply = (supply - burn + mint).min(config.supply.supply_cap);

    GovernorStep {
        new_supply,
        burn,
        mint,
    }
}

/// Validator fund after an epoch's income and fixed cost
pub fn update_fund(fund: f64, fees: f64, mint: f64, config: &SimulationConfig) -> f64 {
    fund + validator_fee(fees, config) + mint - config.supply.validator_cost
}

/// Net issuance relative to post-step supply
pub fn inflation_rate(mint: f64, burn: f64, new_supply: f64) -> f64 {
    (mint - burn) / new_supply.max(1.0)
}
