//! Simulation configuration
//!
//! One immutable [`SimulationConfig`] is passed into every governor,
//! controller and sweep call. Defaults reproduce the v0.7 pre-deploy audit
//! constants. Configs load from TOML; every section is optional.

use crate::errors::MonetaryError;
use crate::types::{GainBounds, ParamBounds, PolicyParams};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Tolerance when checking that routing ratios sum to at most one
pub const RATIO_EPSILON: f64 = 1e-9;

/// Longest run a config may request; record buffers are sized from it
pub const MAX_EPOCHS: u64 = 10_000_000;

/// Complete configuration of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of epochs to simulate
    pub epochs: u64,
    /// Seed for every synthetic signal
    pub seed: u64,
    pub supply: SupplyConfig,
    pub routing: FeeRouting,
    pub ecology: EcoCoupling,
    pub control: ControlConfig,
    pub basefee: BasefeeConfig,
    pub signals: SignalConfig,
    pub sweep: SweepConfig,
    pub sensitivity: SensitivityConfig,
    pub feed: FeedConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            epochs: 1000,
            seed: 42,
            supply: SupplyConfig::default(),
            routing: FeeRouting::default(),
            ecology: EcoCoupling::default(),
            control: ControlConfig::default(),
            basefee: BasefeeConfig::default(),
            signals: SignalConfig::default(),
            sweep: SweepConfig::default(),
            sensitivity: SensitivityConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

/// Supply, cap and validator economics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    pub initial_supply: f64,
    /// Hard ceiling; supply never exceeds it
    pub supply_cap: f64,
    pub initial_fund: f64,
    /// Fixed validator operating cost per epoch
    pub validator_cost: f64,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            initial_supply: 200_000_000.0,
            supply_cap: 221_000_000.0,
            initial_fund: 1_000_000.0,
            validator_cost: 1_000_000.0,
        }
    }
}

/// Fee routing ratios; the unrouted remainder stays with the community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeRouting {
    pub burn_ratio: f64,
    pub validator_ratio: f64,
    pub community_ratio: f64,
}

impl Default for FeeRouting {
    fn default() -> Self {
        Self {
            burn_ratio: 0.4,
            validator_ratio: 0.4,
            community_ratio: 0.2,
        }
    }
}

impl FeeRouting {
    pub fn total(&self) -> f64 {
        self.burn_ratio + self.validator_ratio + self.community_ratio
    }

    /// Share of fees neither burned, paid to validators nor sent to the community
    pub fn retained(&self) -> f64 {
        (1.0 - self.total()).max(0.0)
    }
}

/// Ecological coupling of the burn path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcoCoupling {
    pub enabled: bool,
    pub impact_scale: f64,
}

impl Default for EcoCoupling {
    fn default() -> Self {
        Self {
            enabled: true,
            impact_scale: 0.05,
        }
    }
}

impl EcoCoupling {
    /// Slope of burn/fee against the eco index the governor is designed to produce
    pub fn expected_slope(&self, routing: &FeeRouting) -> f64 {
        if self.enabled {
            routing.burn_ratio * self.impact_scale
        } else {
            0.0
        }
    }
}

/// PID gains; fixed for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.8,
            ki: 0.03,
            kd: 0.10,
        }
    }
}

/// Controller starting point, bounds and trigger thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub initial: PolicyParams,
    pub bounds: GainBounds,
    /// Inflation above this tightens (more burn, less mint)
    pub inflation_upper: f64,
    /// Inflation below this loosens
    pub inflation_lower: f64,
    /// Multiplicative step of the threshold controller
    pub threshold_step: f64,
    pub pid: PidGains,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            initial: PolicyParams::default(),
            bounds: GainBounds::default(),
            inflation_upper: 0.02,
            inflation_lower: -0.02,
            threshold_step: 0.05,
            pid: PidGains::default(),
        }
    }
}

/// EIP-1559-style baseline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasefeeConfig {
    pub initial_basefee: f64,
    /// Throughput the basefee steers toward
    pub target_usage: f64,
    /// Maximum relative basefee change per epoch
    pub max_change: f64,
    /// Scales basefee × usage down to a burn comparable with the governor
    pub burn_scale: f64,
    pub min_basefee: f64,
}

impl Default for BasefeeConfig {
    fn default() -> Self {
        Self {
            initial_basefee: 1.0,
            target_usage: 800_000.0,
            max_change: 0.125,
            burn_scale: 0.000_000_3,
            min_basefee: 1e-9,
        }
    }
}

/// Stochastic process shape of one exogenous signal.
///
/// `value = max(base * (1 + amp * sin(epoch / period)) * N(1, std) * shock, floor)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalProfile {
    pub base: f64,
    pub seasonal_amplitude: f64,
    pub seasonal_period: f64,
    pub noise_std: f64,
    pub shock_probability: f64,
    pub shock_min: f64,
    pub shock_max: f64,
    pub floor: f64,
}

impl Default for SignalProfile {
    fn default() -> Self {
        Self::audit_eco()
    }
}

impl SignalProfile {
    /// Ecological index with smooth seasonality and fat-tail drops
    pub fn audit_eco() -> Self {
        Self {
            base: 1.0,
            seasonal_amplitude: 0.12,
            seasonal_period: 10.0,
            noise_std: 0.08,
            shock_probability: 0.02,
            shock_min: 0.6,
            shock_max: 0.9,
            floor: 0.5,
        }
    }

    /// Fee throughput with seasonality and occasional demand collapses
    pub fn audit_throughput() -> Self {
        Self {
            base: 800_000.0,
            seasonal_amplitude: 0.3,
            seasonal_period: 6.0,
            noise_std: 0.1,
            shock_probability: 0.02,
            shock_min: 0.4,
            shock_max: 0.8,
            floor: 0.0,
        }
    }

    /// Shock-free ecological index of the v0.6 model
    pub fn calm_eco() -> Self {
        Self {
            base: 1.0,
            seasonal_amplitude: 0.1,
            seasonal_period: 8.0,
            noise_std: 0.05,
            shock_probability: 0.0,
            shock_min: 1.0,
            shock_max: 1.0,
            floor: 0.0,
        }
    }

    /// Shock-free throughput of the v0.6 model
    pub fn calm_throughput() -> Self {
        Self {
            shock_probability: 0.0,
            shock_min: 1.0,
            shock_max: 1.0,
            ..Self::audit_throughput()
        }
    }

    fn validate(&self, name: &str) -> Result<(), MonetaryError> {
        let fields = [
            self.base,
            self.seasonal_amplitude,
            self.seasonal_period,
            self.noise_std,
            self.shock_probability,
            self.shock_min,
            self.shock_max,
            self.floor,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(MonetaryError::invalid(format!(
                "signal profile {name} contains a non-finite value"
            )));
        }
        if self.seasonal_period <= 0.0 {
            return Err(MonetaryError::invalid(format!(
                "signal profile {name}: seasonal_period must be positive"
            )));
        }
        if self.noise_std < 0.0 {
            return Err(MonetaryError::invalid(format!(
                "signal profile {name}: noise_std must be non-negative"
            )));
        }
        if !(0.0..=1.0).contains(&self.shock_probability) {
            return Err(MonetaryError::invalid(format!(
                "signal profile {name}: shock_probability must be within [0, 1]"
            )));
        }
        if self.shock_min > self.shock_max {
            return Err(MonetaryError::invalid(format!(
                "signal profile {name}: shock_min exceeds shock_max"
            )));
        }
        Ok(())
    }
}

/// Signal processes feeding the governor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub eco: SignalProfile,
    pub throughput: SignalProfile,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self::audit()
    }
}

impl SignalConfig {
    /// Live-style volatility with shocks
    pub fn audit() -> Self {
        Self {
            eco: SignalProfile::audit_eco(),
            throughput: SignalProfile::audit_throughput(),
        }
    }

    /// Smooth seasonal signals without shocks
    pub fn calm() -> Self {
        Self {
            eco: SignalProfile::calm_eco(),
            throughput: SignalProfile::calm_throughput(),
        }
    }
}

/// Initial `(alpha, beta)` grid for the sensitivity sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub alpha_start: f64,
    pub alpha_end: f64,
    pub alpha_steps: usize,
    pub beta_start: f64,
    pub beta_end: f64,
    pub beta_steps: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            alpha_start: 0.5,
            alpha_end: 0.9,
            alpha_steps: 5,
            beta_start: 0.2,
            beta_end: 0.6,
            beta_steps: 5,
        }
    }
}

/// Static net-mint surface grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub eco_min: f64,
    pub eco_max: f64,
    pub eco_steps: usize,
    pub throughput_min: f64,
    pub throughput_max: f64,
    pub throughput_steps: usize,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            eco_min: 0.7,
            eco_max: 1.4,
            eco_steps: 20,
            throughput_min: 400_000.0,
            throughput_max: 1_200_000.0,
            throughput_steps: 20,
        }
    }
}

/// Optional external ecological feed and dashboard streaming (both off by default)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub use_live_feed: bool,
    pub eco_url: String,
    pub enable_streaming: bool,
    pub dashboard_url: String,
    /// Push every n-th epoch record
    pub stream_interval: u64,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            use_live_feed: false,
            eco_url: "https://regen.gaiaai.xyz/api/v1/ecological-metrics".to_string(),
            enable_streaming: false,
            dashboard_url: "https://dashboard.regen.network/api/v1/update".to_string(),
            stream_interval: 10,
            timeout_secs: 5,
        }
    }
}

impl SimulationConfig {
    /// Parse a TOML document; missing sections take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, MonetaryError> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MonetaryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MonetaryError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(target: "monetary", "Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Fail fast on configurations the core cannot honour.
    pub fn validate(&self) -> Result<(), MonetaryError> {
        if self.epochs == 0 {
            return Err(MonetaryError::invalid("epochs must be positive"));
        }
        if self.epochs > MAX_EPOCHS {
            return Err(MonetaryError::invalid(format!(
                "epochs must be at most {MAX_EPOCHS}, got {}",
                self.epochs
            )));
        }

        let s = &self.supply;
        for (name, value) in [
            ("initial_supply", s.initial_supply),
            ("supply_cap", s.supply_cap),
            ("initial_fund", s.initial_fund),
            ("validator_cost", s.validator_cost),
        ] {
            if !value.is_finite() {
                return Err(MonetaryError::invalid(format!("{name} must be finite")));
            }
        }
        if s.supply_cap <= 0.0 {
            return Err(MonetaryError::invalid("supply_cap must be positive"));
        }
        if s.initial_supply > s.supply_cap {
            return Err(MonetaryError::invalid(format!(
                "initial_supply {} exceeds supply_cap {}",
                s.initial_supply, s.supply_cap
            )));
        }
        if s.validator_cost < 0.0 {
            return Err(MonetaryError::invalid("validator_cost must be non-negative"));
        }

        let r = &self.routing;
        for (name, value) in [
            ("burn_ratio", r.burn_ratio),
            ("validator_ratio", r.validator_ratio),
            ("community_ratio", r.community_ratio),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(MonetaryError::invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if r.total() > 1.0 + RATIO_EPSILON {
            return Err(MonetaryError::invalid(format!(
                "fee routing ratios sum to {} (> 1)",
                r.total()
            )));
        }

        if !self.ecology.impact_scale.is_finite() {
            return Err(MonetaryError::invalid("eco impact_scale must be finite"));
        }

        let c = &self.control;
        check_bounds("alpha", c.bounds.alpha)?;
        check_bounds("beta", c.bounds.beta)?;
        if !c.initial.alpha.is_finite() || !c.initial.beta.is_finite() {
            return Err(MonetaryError::invalid("initial alpha/beta must be finite"));
        }
        if !(c.inflation_lower.is_finite() && c.inflation_upper.is_finite())
            || c.inflation_lower > c.inflation_upper
        {
            return Err(MonetaryError::invalid(
                "inflation thresholds must be finite with lower <= upper",
            ));
        }
        if !c.threshold_step.is_finite() || !(0.0..1.0).contains(&c.threshold_step) {
            return Err(MonetaryError::invalid("threshold_step must be within [0, 1)"));
        }
        if ![c.pid.kp, c.pid.ki, c.pid.kd].iter().all(|g| g.is_finite()) {
            return Err(MonetaryError::invalid("PID gains must be finite"));
        }

        let b = &self.basefee;
        if !(b.target_usage.is_finite() && b.target_usage > 0.0) {
            return Err(MonetaryError::invalid("basefee target_usage must be positive"));
        }
        if !(b.max_change.is_finite() && (0.0..1.0).contains(&b.max_change)) {
            return Err(MonetaryError::invalid("basefee max_change must be within [0, 1)"));
        }
        if !(b.initial_basefee.is_finite() && b.burn_scale.is_finite() && b.min_basefee.is_finite())
        {
            return Err(MonetaryError::invalid("basefee settings must be finite"));
        }

        self.signals.eco.validate("eco")?;
        self.signals.throughput.validate("throughput")?;

        if self.sweep.alpha_steps == 0 || self.sweep.beta_steps == 0 {
            return Err(MonetaryError::invalid("sweep grid needs at least one step per axis"));
        }
        if self.sensitivity.eco_steps == 0 || self.sensitivity.throughput_steps == 0 {
            return Err(MonetaryError::invalid(
                "sensitivity grid needs at least one step per axis",
            ));
        }
        if self.feed.enable_streaming && self.feed.stream_interval == 0 {
            return Err(MonetaryError::invalid("stream_interval must be positive"));
        }

        Ok(())
    }
}

fn check_bounds(name: &str, bounds: ParamBounds) -> Result<(), MonetaryError> {
    if !bounds.min.is_finite() || !bounds.max.is_finite() || bounds.min > bounds.max {
        return Err(MonetaryError::invalid(format!(
            "{name} bounds must be finite with min <= max (got [{}, {}])",
            bounds.min, bounds.max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_audit_constants() {
        let c = SimulationConfig::default();
        assert_eq!(c.epochs, 1000);
        assert_eq!(c.supply.supply_cap, 221_000_000.0);
        assert_eq!(c.supply.initial_supply, 200_000_000.0);
        assert_eq!(c.routing.total(), 1.0);
        assert_eq!(c.control.initial, PolicyParams::new(0.7, 1.0));
        assert_eq!(c.control.bounds.alpha, ParamBounds::new(0.4, 1.0));
        assert_eq!(c.control.bounds.beta, ParamBounds::new(0.8, 1.2));
        assert!(!c.feed.use_live_feed);
        assert!(!c.feed.enable_streaming);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rejects_overcommitted_routing() {
        let mut c = SimulationConfig::default();
        c.routing.community_ratio = 0.3;
        let err = c.validate().unwrap_err();
        assert!(matches!(err, MonetaryError::InvalidInput(_)));
    }

    #[test]
    fn test_underallocated_routing_is_retained() {
        let mut c = SimulationConfig::default();
        c.routing.community_ratio = 0.1;
        assert!(c.validate().is_ok());
        assert!((c.routing.retained() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_inverted_bounds_and_thresholds() {
        let mut c = SimulationConfig::default();
        c.control.bounds.alpha = ParamBounds::new(1.0, 0.4);
        assert!(c.validate().is_err());

        let mut c = SimulationConfig::default();
        c.control.inflation_lower = 0.05;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_rejects_supply_above_cap() {
        let mut c = SimulationConfig::default();
        c.supply.initial_supply = c.supply.supply_cap + 1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_rejects_unbounded_epochs() {
        let mut c = SimulationConfig::default();
        c.epochs = MAX_EPOCHS;
        assert!(c.validate().is_ok());
        c.epochs = u64::MAX;
        let err = c.validate().unwrap_err();
        assert!(matches!(err, MonetaryError::InvalidInput(_)));
        assert!(SimulationConfig::from_toml_str("epochs = 18446744073709551615").is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let c = SimulationConfig::from_toml_str(
            r#"
            epochs = 52
            seed = 7

            [routing]
            burn_ratio = 0.3
            validator_ratio = 0.5
            community_ratio = 0.2

            [control.bounds.alpha]
            min = 0.3
            max = 0.9
            "#,
        )
        .unwrap();

        assert_eq!(c.epochs, 52);
        assert_eq!(c.seed, 7);
        assert_eq!(c.routing.validator_ratio, 0.5);
        assert_eq!(c.control.bounds.alpha, ParamBounds::new(0.3, 0.9));
        assert_eq!(c.control.bounds.beta, ParamBounds::new(0.8, 1.2));
        assert_eq!(c.supply, SupplyConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let err = SimulationConfig::from_toml_str("epochs = \"many\"").unwrap_err();
        assert!(matches!(err, MonetaryError::ConfigParse(_)));
    }

    #[test]
    fn test_expected_slope() {
        let c = SimulationConfig::default();
        assert!((c.ecology.expected_slope(&c.routing) - 0.02).abs() < 1e-15);

        let off = EcoCoupling {
            enabled: false,
            ..EcoCoupling::default()
        };
        assert_eq!(off.expected_slope(&c.routing), 0.0);
    }
}
