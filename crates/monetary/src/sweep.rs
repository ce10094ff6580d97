//! Parameter sweep over initial `(alpha, beta)`
//!
//! Each grid point is an independent run with the same seed and controller.
//! Points fan out over the rayon pool; rows come back in grid order.

use crate::confidence::score_confidence;
use crate::config::{SimulationConfig, SweepConfig};
use crate::controller::ControllerKind;
use crate::errors::MonetaryError;
use crate::metrics::MetricsBundle;
use crate::signals::SyntheticSignals;
use crate::simulation::Simulation;
use crate::types::PolicyParams;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Cartesian grid of initial gains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub alphas: Vec<f64>,
    pub betas: Vec<f64>,
}

impl SweepGrid {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            alphas: linspace(config.alpha_start, config.alpha_end, config.alpha_steps),
            betas: linspace(config.beta_start, config.beta_end, config.beta_steps),
        }
    }

    /// Points in alpha-major order
    pub fn points(&self) -> Vec<PolicyParams> {
        self.alphas
            .iter()
            .flat_map(|&a| self.betas.iter().map(move |&b| PolicyParams::new(a, b)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alphas.len() * self.betas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    /// Initial alpha of the run
    pub alpha: f64,
    /// Initial beta of the run
    pub beta: f64,
    pub metrics: MetricsBundle,
    pub confidence: f64,
}

/// Validate `config`, then run every point of `grid` with controller `kind`.
pub fn run_sweep_grid(
    config: &SimulationConfig,
    kind: ControllerKind,
    grid: &SweepGrid,
) -> Result<Vec<SweepRow>, MonetaryError> {
    config.validate()?;
    let rows: Vec<SweepRow> = grid
        .points()
        .into_par_iter()
        .map(|params| {
            let mut signals = SyntheticSignals::new(config.signals.clone(), config.seed);
            let run = Simulation::new(config, kind)
                .with_initial_params(params)
                .run(&mut signals);
            let metrics = MetricsBundle::from_records(&run.records, config);
            let confidence = score_confidence(&metrics, &config.control.bounds);
            SweepRow {
                alpha: params.alpha,
                beta: params.beta,
                metrics,
                confidence,
            }
        })
        .collect();

    let best = rows.iter().map(|r| r.confidence).fold(f64::NEG_INFINITY, f64::max);
    info!(
        target: "sweep",
        "Sweep complete: {} points with {} controller, best confidence {:.3}",
        rows.len(), kind, best
    );
    Ok(rows)
}

/// Sweep the grid described by `config.sweep`.
pub fn run_sweep(
    config: &SimulationConfig,
    kind: ControllerKind,
) -> Result<Vec<SweepRow>, MonetaryError> {
    run_sweep_grid(config, kind, &SweepGrid::from_config(&config.sweep))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        let xs = linspace(0.5, 0.9, 5);
        let expected = [0.5, 0.6, 0.7, 0.8, 0.9];
        assert_eq!(xs.len(), 5);
        for (x, e) in xs.iter().zip(expected) {
            assert!((x - e).abs() < 1e-12);
        }
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn test_default_grid_order() {
        let grid = SweepGrid::from_config(&SweepConfig::default());
        let points = grid.points();
        assert_eq!(points.len(), 25);
        assert!((points[1].alpha - 0.5).abs() < 1e-12);
        assert!((points[1].beta - 0.3).abs() < 1e-12);
        assert!((points[5].alpha - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_rows_in_grid_order() {
        let config = SimulationConfig {
            epochs: 30,
            ..SimulationConfig::default()
        };
        let grid = SweepGrid {
            alphas: vec![0.5, 0.9],
            betas: vec![0.9, 1.1],
        };
        let rows = run_sweep_grid(&config, ControllerKind::Threshold, &grid).unwrap();
        let coords: Vec<(f64, f64)> = rows.iter().map(|r| (r.alpha, r.beta)).collect();
        assert_eq!(coords, vec![(0.5, 0.9), (0.5, 1.1), (0.9, 0.9), (0.9, 1.1)]);
        assert!(rows.iter().all(|r| (0.0..=0.999).contains(&r.confidence)));
    }

    #[test]
    fn test_sweep_is_repeatable() {
        let config = SimulationConfig {
            epochs: 20,
            ..SimulationConfig::default()
        };
        let grid = SweepGrid {
            alphas: vec![0.6],
            betas: vec![0.2, 0.4],
        };
        let a = run_sweep_grid(&config, ControllerKind::Pid, &grid).unwrap();
        let b = run_sweep_grid(&config, ControllerKind::Pid, &grid).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sweep_rejects_overcommitted_routing() {
        let mut config = SimulationConfig {
            epochs: 20,
            ..SimulationConfig::default()
        };
        config.routing.burn_ratio = 0.9;
        config.routing.validator_ratio = 0.9;
        let grid = SweepGrid {
            alphas: vec![0.6],
            betas: vec![0.4],
        };
        let err = run_sweep_grid(&config, ControllerKind::Threshold, &grid).unwrap_err();
        assert!(matches!(err, MonetaryError::InvalidInput(_)));
        let err = run_sweep(&config, ControllerKind::Pid).unwrap_err();
        assert!(matches!(err, MonetaryError::InvalidInput(_)));
    }
}
