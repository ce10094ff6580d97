use super::{ControllerKind, ParameterController};
use crate::config::SimulationConfig;
use crate::types::{GainBounds, PolicyParams};
use tracing::debug;

/// Threshold-hysteresis controller.
///
/// Above the upper threshold it tightens (`alpha` up, `beta` down); below the
/// lower threshold it loosens; inside the deadband the gains hold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdController {
    pub upper: f64,
    pub lower: f64,
    pub step: f64,
    pub bounds: GainBounds,
}

impl ThresholdController {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            upper: config.control.inflation_upper,
            lower: config.control.inflation_lower,
            step: config.control.threshold_step,
            bounds: config.control.bounds,
        }
    }
}

impl ParameterController for ThresholdController {
    fn adjust(&mut self, params: PolicyParams, inflation: f64, _eco_index: f64) -> PolicyParams {
        let next = if inflation > self.upper {
            PolicyParams::new(params.alpha * (1.0 + self.step), params.beta * (1.0 - self.step))
        } else if inflation < self.lower {
            PolicyParams::new(params.alpha * (1.0 - self.step), params.beta * (1.0 + self.step))
        } else {
            params
        };

        let clamped = self.bounds.clamp(next);
        if clamped != params {
            debug!(
                target: "monetary",
                "Threshold adjust: inflation {:.5} -> alpha {:.4} beta {:.4}",
                inflation, clamped.alpha, clamped.beta
            );
        }
        clamped
    }

    fn kind(&self) -> ControllerKind {
        ControllerKind::Threshold
    }
}
