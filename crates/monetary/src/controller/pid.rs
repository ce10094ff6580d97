use super::{ControllerKind, ParameterController};
use crate::config::{PidGains, SimulationConfig};
use crate::types::{GainBounds, PolicyParams};

/// PID controller steering inflation toward zero.
///
/// Error is `-inflation`. `alpha` moves with the error, `beta` against it;
/// the integral term pushes both the same way. Memory persists across
/// epochs of one run and is private to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    pub gains: PidGains,
    pub bounds: GainBounds,
    integral: f64,
    prev_error: f64,
}

impl PidController {
    pub fn new(gains: PidGains, bounds: GainBounds) -> Self {
        Self {
            gains,
            bounds,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.control.pid, config.control.bounds)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}

impl ParameterController for PidController {
    fn adjust(&mut self, params: PolicyParams, inflation: f64, _eco_index: f64) -> PolicyParams {
        if !inflation.is_finite() {
            return self.bounds.clamp(params);
        }

        let error = -inflation;
        self.integral += error;
        let derivative = error - self.prev_error;
        self.prev_error = error;

        let PidGains { kp, ki, kd } = self.gains;
        let next = PolicyParams::new(
            params.alpha + kp * error + ki * self.integral + kd * derivative,
            params.beta - kp * error + ki * self.integral - kd * derivative,
        );
        self.bounds.clamp(next)
    }

    fn kind(&self) -> ControllerKind {
        ControllerKind::Pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_first_step() {
        let mut pid = PidController::from_config(&SimulationConfig::default());
        // inflation 0.01 -> e = -0.01, I = -0.01, d = -0.01
        let p = pid.adjust(PolicyParams::new(0.7, 1.0), 0.01, 1.0);
        let alpha = 0.7 + 0.8 * -0.01 + 0.03 * -0.01 + 0.10 * -0.01;
        let beta = 1.0 + 0.8 * 0.01 + 0.03 * -0.01 + 0.10 * 0.01;
        assert!(approx(p.alpha, alpha));
        assert!(approx(p.beta, beta));
        assert!(approx(pid.integral(), -0.01));
    }

    #[test]
    fn test_memory_accumulates_and_resets() {
        let mut pid = PidController::from_config(&SimulationConfig::default());
        let p = PolicyParams::new(0.7, 1.0);
        pid.adjust(p, 0.01, 1.0);
        pid.adjust(p, 0.01, 1.0);
        assert!(approx(pid.integral(), -0.02));
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn test_zero_inflation_is_fixed_point() {
        let mut pid = PidController::from_config(&SimulationConfig::default());
        let p = PolicyParams::new(0.7, 1.0);
        assert_eq!(pid.adjust(p, 0.0, 1.0), p);
    }

    #[test]
    fn test_large_error_saturates() {
        let mut pid = PidController::from_config(&SimulationConfig::default());
        let p = pid.adjust(PolicyParams::new(0.7, 1.0), -10.0, 1.0);
        assert_eq!(p, PolicyParams::new(1.0, 0.8));
    }

    #[test]
    fn test_non_finite_inflation_leaves_memory() {
        let mut pid = PidController::from_config(&SimulationConfig::default());
        let p = pid.adjust(PolicyParams::new(0.7, 1.0), f64::NAN, 1.0);
        assert_eq!(p, PolicyParams::new(0.7, 1.0));
        assert_eq!(pid.integral(), 0.0);
    }
}
