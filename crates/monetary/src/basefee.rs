//! EIP-1559-style basefee baseline
//!
//! A structurally separate comparison model: it owns a basefee multiplier
//! and a supply, burns `basefee * burn_scale * usage` every epoch and never
//! mints. It shares only the throughput signal with the governor runs.

use crate::config::{BasefeeConfig, SimulationConfig};
use crate::signals::SignalSource;
use crate::simulation::record_capacity;
use crate::types::EpochIndex;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One epoch of the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasefeeRecord {
    pub epoch: EpochIndex,
    pub usage: f64,
    pub basefee: f64,
    pub burn: f64,
    pub supply: f64,
}

/// Basefee model state
#[derive(Debug, Clone, PartialEq)]
pub struct BasefeeModel {
    config: BasefeeConfig,
    basefee: f64,
    supply: f64,
}

impl BasefeeModel {
    pub fn new(config: BasefeeConfig, initial_supply: f64) -> Self {
        Self {
            basefee: config.initial_basefee,
            supply: initial_supply,
            config,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.basefee.clone(), config.supply.initial_supply)
    }

    pub fn basefee(&self) -> f64 {
        self.basefee
    }

    pub fn supply(&self) -> f64 {
        self.supply
    }

    /// Move the basefee toward target usage and burn; returns the burn.
    pub fn step(&mut self, usage: f64) -> f64 {
        let deviation = (usage / self.config.target_usage - 1.0).clamp(-1.0, 1.0);
        let adj = 1.0 + self.config.max_change * deviation;
        self.basefee = (self.basefee * adj).max(self.config.min_basefee);

        let burn = self.basefee * self.config.burn_scale * usage;
        self.supply = (self.supply - burn).max(0.0);
        burn
    }
}

/// Run the baseline over `epochs` of the given signal stream.
pub fn run_basefee_baseline(
    config: &SimulationConfig,
    signals: &mut dyn SignalSource,
) -> Vec<BasefeeRecord> {
    let mut model = BasefeeModel::from_config(config);
    let mut records = Vec::with_capacity(record_capacity(config.epochs));

    for epoch in 0..config.epochs {
        let usage = signals.next_epoch(epoch).fees;
        let burn = model.step(usage);
        records.push(BasefeeRecord {
            epoch,
            usage,
            basefee: model.basefee(),
            burn,
            supply: model.supply(),
        });
    }

    if let Some(last) = records.last() {
        info!(
            target: "monetary",
            "Basefee baseline: {} epochs, final basefee {:.6}, final supply {:.0}",
            records.len(), last.basefee, last.supply
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::ReplayedSignals;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_on_target_holds_basefee() {
        let mut m = BasefeeModel::from_config(&SimulationConfig::default());
        let burn = m.step(800_000.0);
        assert!(approx(m.basefee(), 1.0));
        assert!(approx(burn, 0.24));
        assert!(approx(m.supply(), 200_000_000.0 - 0.24));
    }

    #[test]
    fn test_adjustment_is_capped() {
        let mut m = BasefeeModel::from_config(&SimulationConfig::default());
        m.step(1e12);
        assert!(approx(m.basefee(), 1.125));

        let mut m = BasefeeModel::from_config(&SimulationConfig::default());
        m.step(400_000.0);
        assert!(approx(m.basefee(), 0.9375));
    }

    #[test]
    fn test_basefee_floor() {
        let mut m = BasefeeModel::from_config(&SimulationConfig::default());
        for _ in 0..500 {
            m.step(0.0);
        }
        assert!(m.basefee() >= 1e-9);
    }

    #[test]
    fn test_supply_never_negative() {
        let mut config = SimulationConfig::default();
        config.basefee.burn_scale = 1.0;
        config.supply.initial_supply = 10.0;
        let mut m = BasefeeModel::from_config(&config);
        m.step(1e9);
        assert_eq!(m.supply(), 0.0);
    }

    #[test]
    fn test_baseline_length() {
        let mut config = SimulationConfig::default();
        config.epochs = 12;
        let mut signals = ReplayedSignals::from_fees(vec![800_000.0, 900_000.0]).unwrap();
        let records = run_basefee_baseline(&config, &mut signals);
        assert_eq!(records.len(), 12);
        assert_eq!(records[3].usage, 900_000.0);
        assert!(records.windows(2).all(|w| w[1].supply <= w[0].supply));
    }
}
