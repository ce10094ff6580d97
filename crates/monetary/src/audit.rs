//! Pre-deploy policy comparison audit
//!
//! Runs the threshold controller (primary), the PID reference and the
//! basefee baseline on the same seeded signals, scores the controller runs,
//! sweeps the initial-gain grid and evaluates the sensitivity surface.

use crate::basefee::{run_basefee_baseline, BasefeeRecord};
use crate::confidence::ConfidenceBreakdown;
use crate::config::SimulationConfig;
use crate::controller::ControllerKind;
use crate::errors::MonetaryError;
use crate::metrics::MetricsBundle;
use crate::sensitivity::{sensitivity_surface, SensitivitySurface};
use crate::signals::SyntheticSignals;
use crate::simulation::{run_simulation, Simulation, SimulationRun};
use crate::sweep::{run_sweep, SweepRow};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const AUDIT_NOTE: &str = "Offline audit uses synthetic live-style volatility; replace eco/throughput feeds with chain telemetry for production calibration.";

/// Scored outcome of one controller policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReport {
    pub controller: ControllerKind,
    pub metrics: MetricsBundle,
    pub breakdown: ConfidenceBreakdown,
    pub confidence: f64,
}

impl PolicyReport {
    pub fn from_run(run: &SimulationRun, config: &SimulationConfig) -> Self {
        let metrics = MetricsBundle::from_records(&run.records, config);
        let breakdown = ConfidenceBreakdown::from_metrics(&metrics, &config.control.bounds);
        Self {
            controller: run.controller,
            confidence: breakdown.score,
            metrics,
            breakdown,
        }
    }
}

/// Everything the audit produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub epochs: u64,
    pub seed: u64,
    pub primary: PolicyReport,
    pub pid: PolicyReport,
    pub threshold_run: SimulationRun,
    pub pid_run: SimulationRun,
    pub baseline: Vec<BasefeeRecord>,
    pub sweep: Vec<SweepRow>,
    pub sensitivity: SensitivitySurface,
    pub note: String,
}

impl AuditReport {
    pub fn confidence(&self) -> f64 {
        self.primary.confidence
    }

    pub fn baseline_final_supply(&self) -> Option<f64> {
        self.baseline.last().map(|r| r.supply)
    }
}

/// Validate `config` and run the full comparison.
pub fn run_audit(config: &SimulationConfig) -> Result<AuditReport, MonetaryError> {
    config.validate()?;

    let threshold_run = run_simulation(config, ControllerKind::Threshold)?;

    let mut pid_signals = SyntheticSignals::new(config.signals.clone(), config.seed);
    let pid_run = Simulation::new(config, ControllerKind::Pid).run(&mut pid_signals);

    let mut baseline_signals = SyntheticSignals::new(config.signals.clone(), config.seed);
    let baseline = run_basefee_baseline(config, &mut baseline_signals);

    let primary = PolicyReport::from_run(&threshold_run, config);
    let pid = PolicyReport::from_run(&pid_run, config);
    let sweep = run_sweep(config, ControllerKind::Threshold)?;
    let sensitivity = sensitivity_surface(config);

    info!(
        target: "monetary",
        "Audit complete: threshold confidence {:.3}, pid confidence {:.3}",
        primary.confidence, pid.confidence
    );

    Ok(AuditReport {
        epochs: config.epochs,
        seed: config.seed,
        primary,
        pid,
        threshold_run,
        pid_run,
        baseline,
        sweep,
        sensitivity,
        note: AUDIT_NOTE.to_string(),
    })
}
