//! Run statistics over a finished record sequence
//!
//! - [`RunMetrics`]: inflation, fund drift, eco coupling, burn/mint balance
//! - [`ControlMetrics`]: observed gain ranges and per-epoch step sizes
//!
//! Degenerate statistics (zero variance, fewer than two records) report 0
//! instead of NaN so every bundle serializes cleanly.

use crate::config::SimulationConfig;
use crate::types::EpochRecord;
use serde::{Deserialize, Serialize};

/// Arithmetic mean; 0 for an empty slice
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1); 0 below two samples
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

fn centered_moments(xs: &[f64], ys: &[f64]) -> (f64, f64, f64) {
    let mx = mean(xs);
    let my = mean(ys);
    xs.iter().zip(ys).fold((0.0, 0.0, 0.0), |(sxy, sxx, syy), (x, y)| {
        let dx = x - mx;
        let dy = y - my;
        (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
    })
}

/// Pearson correlation; 0 when either series has no variance
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let (sxy, sxx, syy) = centered_moments(xs, ys);
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Least-squares slope of `ys` on `xs`; 0 below two points or with constant `xs`
pub fn regression_slope(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let (sxy, sxx, _) = centered_moments(xs, ys);
    if sxx == 0.0 {
        return 0.0;
    }
    sxy / sxx
}

fn min_max(xs: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    if lo > hi {
        (0.0, 0.0)
    } else {
        (lo, hi)
    }
}

fn max_abs_step(xs: &[f64]) -> f64 {
    xs.windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max)
}

/// Outcome statistics of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub infl_mean: f64,
    pub infl_std: f64,
    /// `(last - first) / max(|first|, 1)` over the validator fund
    pub fund_drift_pct: f64,
    pub eco_infl_corr: f64,
    pub eco_burn_corr: f64,
    pub eco_burn_per_fee_corr: f64,
    /// Designed slope of burn/fee against the eco index
    pub eco_coupling_expected: f64,
    /// Observed slope of burn/fee against the eco index
    pub eco_coupling_slope: f64,
    pub burn_to_mint_ratio: f64,
    pub alpha_min: f64,
    pub alpha_max: f64,
    pub beta_min: f64,
    pub beta_max: f64,
}

impl RunMetrics {
    pub fn from_records(records: &[EpochRecord], config: &SimulationConfig) -> Self {
        let expected = config.ecology.expected_slope(&config.routing);
        if records.is_empty() {
            return Self {
                eco_coupling_expected: expected,
                ..Self::default()
            };
        }

        let inflation: Vec<f64> = records.iter().map(|r| r.inflation_rate).collect();
        let eco: Vec<f64> = records.iter().map(|r| r.eco_index).collect();
        let burn: Vec<f64> = records.iter().map(|r| r.burn).collect();
        let burn_per_fee: Vec<f64> = records.iter().map(EpochRecord::burn_per_fee).collect();

        let first_fund = records[0].fund;
        let last_fund = records[records.len() - 1].fund;

        let total_burn: f64 = burn.iter().sum();
        let total_mint: f64 = records.iter().map(|r| r.mint).sum();

        let (alpha_min, alpha_max) = min_max(records.iter().map(|r| r.alpha));
        let (beta_min, beta_max) = min_max(records.iter().map(|r| r.beta));

        Self {
            infl_mean: mean(&inflation),
            infl_std: sample_std(&inflation),
            fund_drift_pct: (last_fund - first_fund) / first_fund.abs().max(1.0),
            eco_infl_corr: pearson(&eco, &inflation),
            eco_burn_corr: pearson(&eco, &burn),
            eco_burn_per_fee_corr: pearson(&eco, &burn_per_fee),
            eco_coupling_expected: expected,
            eco_coupling_slope: regression_slope(&eco, &burn_per_fee),
            burn_to_mint_ratio: total_burn / total_mint.max(1e-9),
            alpha_min,
            alpha_max,
            beta_min,
            beta_max,
        }
    }
}

/// Boundedness and smoothness of the controller trajectory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlMetrics {
    pub alpha_min_obs: f64,
    pub alpha_max_obs: f64,
    pub beta_min_obs: f64,
    pub beta_max_obs: f64,
    pub alpha_max_step: f64,
    pub beta_max_step: f64,
}

impl ControlMetrics {
    pub fn from_records(records: &[EpochRecord]) -> Self {
        let alphas: Vec<f64> = records.iter().map(|r| r.alpha).collect();
        let betas: Vec<f64> = records.iter().map(|r| r.beta).collect();
        let (alpha_min_obs, alpha_max_obs) = min_max(alphas.iter().copied());
        let (beta_min_obs, beta_max_obs) = min_max(betas.iter().copied());

        Self {
            alpha_min_obs,
            alpha_max_obs,
            beta_min_obs,
            beta_max_obs,
            alpha_max_step: max_abs_step(&alphas),
            beta_max_step: max_abs_step(&betas),
        }
    }
}

/// Run and control metrics of one record sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    pub run: RunMetrics,
    pub control: ControlMetrics,
}

impl MetricsBundle {
    pub fn from_records(records: &[EpochRecord], config: &SimulationConfig) -> Self {
        Self {
            run: RunMetrics::from_records(records, config),
            control: ControlMetrics::from_records(records),
        }
    }

    /// Flat `(name, value)` view in a stable column order
    pub fn to_named_values(&self) -> Vec<(&'static str, f64)> {
        let r = &self.run;
        let c = &self.control;
        vec![
            ("infl_mean", r.infl_mean),
            ("infl_std", r.infl_std),
            ("fund_drift_pct", r.fund_drift_pct),
            ("eco_infl_corr", r.eco_infl_corr),
            ("eco_burn_corr", r.eco_burn_corr),
            ("eco_burn_per_fee_corr", r.eco_burn_per_fee_corr),
            ("eco_coupling_expected", r.eco_coupling_expected),
            ("eco_coupling_slope", r.eco_coupling_slope),
            ("burn_to_mint_ratio", r.burn_to_mint_ratio),
            ("alpha_min", r.alpha_min),
            ("alpha_max", r.alpha_max),
            ("beta_min", r.beta_min),
            ("beta_max", r.beta_max),
            ("alpha_min_obs", c.alpha_min_obs),
            ("alpha_max_obs", c.alpha_max_obs),
            ("beta_min_obs", c.beta_min_obs),
            ("beta_max_obs", c.beta_max_obs),
            ("alpha_max_step", c.alpha_max_step),
            ("beta_max_step", c.beta_max_step),
        ]
    }
}
