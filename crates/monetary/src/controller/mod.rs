//! Parameter controllers
//!
//! A controller maps `(params, inflation, eco_index)` to the next epoch's
//! gains. Every variant saturates both gains into the configured bounds on
//! every update, so a run that starts outside the bounds is pulled inside
//! after the first epoch.

mod pid;
mod threshold;

pub use pid::PidController;
pub use threshold::ThresholdController;

use crate::config::SimulationConfig;
use crate::types::PolicyParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gain-adjustment capability
pub trait ParameterController {
    /// Next epoch's gains; always inside the controller's bounds.
    fn adjust(&mut self, params: PolicyParams, inflation: f64, eco_index: f64) -> PolicyParams;

    fn kind(&self) -> ControllerKind;
}

/// Selectable controller policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Multiplicative steps outside an inflation deadband
    Threshold,
    /// Proportional-integral-derivative toward zero inflation
    Pid,
}

impl ControllerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerKind::Threshold => "threshold",
            ControllerKind::Pid => "pid",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControllerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "threshold" => Ok(ControllerKind::Threshold),
            "pid" => Ok(ControllerKind::Pid),
            other => Err(format!("unknown controller '{other}' (expected threshold or pid)")),
        }
    }
}

/// Closed set of controller policies, dispatched statically
#[derive(Debug, Clone, PartialEq)]
pub enum Controller {
    Threshold(ThresholdController),
    Pid(PidController),
}

impl Controller {
    /// Fresh controller (empty PID memory) for the given policy.
    pub fn from_config(kind: ControllerKind, config: &SimulationConfig) -> Self {
        match kind {
            ControllerKind::Threshold => {
                Controller::Threshold(ThresholdController::from_config(config))
            }
            ControllerKind::Pid => Controller::Pid(PidController::from_config(config)),
        }
    }
}

impl ParameterController for Controller {
    fn adjust(&mut self, params: PolicyParams, inflation: f64, eco_index: f64) -> PolicyParams {
        match self {
            Controller::Threshold(c) => c.adjust(params, inflation, eco_index),
            Controller::Pid(c) => c.adjust(params, inflation, eco_index),
        }
    }

    fn kind(&self) -> ControllerKind {
        match self {
            Controller::Threshold(_) => ControllerKind::Threshold,
            Controller::Pid(_) => ControllerKind::Pid,
        }
    }
}
