//! Static net-mint sensitivity surface
//!
//! Evaluates the governor's validator-gap response over a grid of eco index
//! and fee throughput, with no RNG and no state. Positive cells are net
//! mint, negative cells net burn, in millions of REGEN.

use crate::config::{SensitivityConfig, SimulationConfig};
use crate::governor::eco_modifier;
use crate::sweep::linspace;
use crate::types::PolicyParams;
use serde::{Deserialize, Serialize};

/// Net-mint grid; `values[i][j]` pairs `eco_values[i]` with `throughput_values[j]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySurface {
    pub eco_values: Vec<f64>,
    pub throughput_values: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

impl SensitivitySurface {
    /// `(eco, throughput, net_mint_m)` triples in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.eco_values.iter().zip(&self.values).flat_map(move |(&eco, row)| {
            self.throughput_values
                .iter()
                .zip(row)
                .map(move |(&fees, &v)| (eco, fees, v))
        })
    }
}

/// Net mint in millions of REGEN at one grid point
pub fn net_mint_millions(
    eco_index: f64,
    fees: f64,
    params: PolicyParams,
    config: &SimulationConfig,
) -> f64 {
    let eco_mod = eco_modifier(eco_index, config);
    let cost = config.supply.validator_cost;
    let burn = params.alpha * eco_mod * (fees - cost).max(0.0);
    let mint = if eco_mod > 0.0 {
        (params.beta / eco_mod) * (cost - fees).max(0.0)
    } else {
        0.0
    };
    (mint - burn) / 1e6
}

/// Surface over `grid` at the configured initial gains.
pub fn sensitivity_surface_with(
    config: &SimulationConfig,
    grid: &SensitivityConfig,
) -> SensitivitySurface {
    let eco_values = linspace(grid.eco_min, grid.eco_max, grid.eco_steps);
    let throughput_values =
        linspace(grid.throughput_min, grid.throughput_max, grid.throughput_steps);
    let params = config.control.initial;

    let values = eco_values
        .iter()
        .map(|&eco| {
            throughput_values
                .iter()
                .map(|&fees| net_mint_millions(eco, fees, params, config))
                .collect()
        })
        .collect();

    SensitivitySurface {
        eco_values,
        throughput_values,
        values,
    }
}

pub fn sensitivity_surface(config: &SimulationConfig) -> SensitivitySurface {
    sensitivity_surface_with(config, &config.sensitivity)
}
