//! Composite confidence score
//!
//! Each readiness dimension yields a pass score in `[0, 1]` via a soft
//! threshold; the weighted sum is capped just below 1.

use crate::metrics::MetricsBundle;
use crate::types::GainBounds;
use serde::{Deserialize, Serialize};

pub const INFLATION_MEAN_TOLERANCE: f64 = 0.02;
pub const INFLATION_STD_TOLERANCE: f64 = 0.02;
pub const INFLATION_FALLOFF: f64 = 0.05;
pub const FUND_DRIFT_TOLERANCE: f64 = 0.10;
pub const FUND_DRIFT_FALLOFF: f64 = 0.50;
pub const GAIN_STEP_TOLERANCE: f64 = 0.25;
pub const GAIN_STEP_FALLOFF: f64 = 0.50;

pub const WEIGHT_INFLATION_MEAN: f64 = 0.20;
pub const WEIGHT_INFLATION_STD: f64 = 0.10;
pub const WEIGHT_FUND: f64 = 0.25;
pub const WEIGHT_CONTROL: f64 = 0.25;
pub const WEIGHT_ECO: f64 = 0.20;

/// Highest reportable score
pub const MAX_CONFIDENCE: f64 = 0.999;

pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

/// 1 within tolerance, falling linearly to 0 over `width` beyond it
pub fn soft_threshold(x: f64, tolerance: f64, width: f64) -> f64 {
    if x <= tolerance {
        1.0
    } else {
        clamp01(1.0 - (x - tolerance) / width)
    }
}

/// Per-dimension pass scores behind one confidence value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub inflation_mean_ok: f64,
    pub inflation_std_ok: f64,
    pub fund_ok: f64,
    pub bounded_ok: f64,
    pub smooth_ok: f64,
    pub eco_ok: f64,
    pub score: f64,
}

/// Score eco-coupling fidelity: full marks within ±50% of the designed slope.
pub fn eco_fidelity(expected: f64, observed: f64) -> f64 {
    if expected > 0.0 {
        if (0.5 * expected..=1.5 * expected).contains(&observed) {
            1.0
        } else {
            clamp01(1.0 - (observed - expected).abs() / (2.0 * expected))
        }
    } else {
        0.5
    }
}

impl ConfidenceBreakdown {
    pub fn from_metrics(metrics: &MetricsBundle, bounds: &GainBounds) -> Self {
        let m = &metrics.run;
        let c = &metrics.control;

        let inflation_mean_ok =
            soft_threshold(m.infl_mean.abs(), INFLATION_MEAN_TOLERANCE, INFLATION_FALLOFF);
        let inflation_std_ok =
            soft_threshold(m.infl_std, INFLATION_STD_TOLERANCE, INFLATION_FALLOFF);
        let fund_ok =
            soft_threshold(m.fund_drift_pct.abs(), FUND_DRIFT_TOLERANCE, FUND_DRIFT_FALLOFF);

        let alpha_bounded =
            bounds.alpha.min <= c.alpha_min_obs && c.alpha_max_obs <= bounds.alpha.max;
        let beta_bounded = bounds.beta.min <= c.beta_min_obs && c.beta_max_obs <= bounds.beta.max;
        let bounded_ok = if alpha_bounded && beta_bounded { 1.0 } else { 0.0 };

        let smooth_ok = soft_threshold(c.alpha_max_step, GAIN_STEP_TOLERANCE, GAIN_STEP_FALLOFF)
            * soft_threshold(c.beta_max_step, GAIN_STEP_TOLERANCE, GAIN_STEP_FALLOFF);

        let eco_ok = eco_fidelity(m.eco_coupling_expected, m.eco_coupling_slope);

        let score = WEIGHT_INFLATION_MEAN * inflation_mean_ok
            + WEIGHT_INFLATION_STD * inflation_std_ok
            + WEIGHT_FUND * fund_ok
            + WEIGHT_CONTROL * (0.6 * bounded_ok + 0.4 * smooth_ok)
            + WEIGHT_ECO * eco_ok;

        Self {
            inflation_mean_ok,
            inflation_std_ok,
            fund_ok,
            bounded_ok,
            smooth_ok,
            eco_ok,
            score: clamp01(score).min(MAX_CONFIDENCE),
        }
    }
}

/// Confidence in `[0, 0.999]` for a metrics bundle under the given gain bounds
pub fn score_confidence(metrics: &MetricsBundle, bounds: &GainBounds) -> f64 {
    ConfidenceBreakdown::from_metrics(metrics, bounds).score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ControlMetrics, RunMetrics};

    fn ideal() -> MetricsBundle {
        MetricsBundle {
            run: RunMetrics {
                eco_coupling_expected: 0.02,
                eco_coupling_slope: 0.02,
                alpha_min: 0.7,
                alpha_max: 0.7,
                beta_min: 1.0,
                beta_max: 1.0,
                ..RunMetrics::default()
            },
            control: ControlMetrics {
                alpha_min_obs: 0.7,
                alpha_max_obs: 0.7,
                beta_min_obs: 1.0,
                beta_max_obs: 1.0,
                ..ControlMetrics::default()
            },
        }
    }

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(0.01, 0.02, 0.05), 1.0);
        assert_eq!(soft_threshold(0.02, 0.02, 0.05), 1.0);
        assert!((soft_threshold(0.045, 0.02, 0.05) - 0.5).abs() < 1e-12);
        assert_eq!(soft_threshold(1.0, 0.02, 0.05), 0.0);
    }

    #[test]
    fn test_ideal_run_is_capped() {
        let score = score_confidence(&ideal(), &GainBounds::default());
        assert_eq!(score, MAX_CONFIDENCE);
    }

    #[test]
    fn test_out_of_bounds_loses_control_weight() {
        let mut m = ideal();
        m.control.beta_min_obs = 0.2;
        let b = ConfidenceBreakdown::from_metrics(&m, &GainBounds::default());
        assert_eq!(b.bounded_ok, 0.0);
        assert!((b.score - (1.0 - 0.25 * 0.6)).abs() < 1e-12);
    }

    #[test]
    fn test_fund_drift_falloff() {
        let mut m = ideal();
        m.run.fund_drift_pct = -0.35;
        let b = ConfidenceBreakdown::from_metrics(&m, &GainBounds::default());
        assert!((b.fund_ok - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_eco_fidelity() {
        assert_eq!(eco_fidelity(0.02, 0.011), 1.0);
        assert_eq!(eco_fidelity(0.02, 0.029), 1.0);
        assert!((eco_fidelity(0.02, 0.0) - 0.5).abs() < 1e-12);
        assert_eq!(eco_fidelity(0.02, -0.03), 0.0);
        assert_eq!(eco_fidelity(0.0, 0.5), 0.5);
    }

    #[test]
    fn test_score_range() {
        let mut m = ideal();
        m.run.infl_mean = 5.0;
        m.run.infl_std = 5.0;
        m.run.fund_drift_pct = 50.0;
        m.run.eco_coupling_slope = -1.0;
        m.control.alpha_max_step = 10.0;
        m.control.alpha_min_obs = -1.0;
        let score = score_confidence(&m, &GainBounds::default());
        assert_eq!(score, 0.0);
    }
}
