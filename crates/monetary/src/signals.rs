//! Exogenous epoch signals: fee throughput and ecological index
//!
//! - [`SyntheticSignals`]: seeded seasonal + Gaussian + shock generators
//! - [`ReplayedSignals`]: caller-supplied traces, cycled when exhausted
//!
//! Per-epoch draw order is fixed (eco index first, then throughput) so a
//! seed maps to exactly one signal stream.

use crate::config::{SignalConfig, SignalProfile};
use crate::errors::MonetaryError;
use crate::feed::{read_or_fallback, EcologicalFeed};
use crate::types::{EcoSource, EpochIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Inputs for one epoch of the governor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochSignals {
    /// Fee revenue in REGEN
    pub fees: f64,
    pub eco_index: f64,
    pub eco_source: EcoSource,
}

/// Anything that can feed the epoch loop
pub trait SignalSource {
    fn next_epoch(&mut self, epoch: EpochIndex) -> EpochSignals;
}

/// Standard normal sample scaled to `N(mean, std)` (Box-Muller, one draw pair per call)
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, std: f64) -> f64 {
    // 1 - [0, 1) keeps ln() finite
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std * z
}

impl SignalProfile {
    /// Deterministic seasonal component
    pub fn seasonal(&self, epoch: EpochIndex) -> f64 {
        1.0 + self.seasonal_amplitude * (epoch as f64 / self.seasonal_period).sin()
    }

    /// Draw one value: noise, shock roll, optional shock magnitude.
    pub fn sample<R: Rng + ?Sized>(&self, epoch: EpochIndex, rng: &mut R) -> f64 {
        let noise = gaussian(rng, 1.0, self.noise_std);
        let shock = if rng.gen::<f64>() < self.shock_probability {
            self.shock_min + (self.shock_max - self.shock_min) * rng.gen::<f64>()
        } else {
            1.0
        };
        (self.base * self.seasonal(epoch) * noise * shock).max(self.floor)
    }
}

/// Seeded synthetic signal generator with an optional external eco feed
pub struct SyntheticSignals {
    rng: StdRng,
    profiles: SignalConfig,
    feed: Option<Box<dyn EcologicalFeed>>,
}

impl SyntheticSignals {
    pub fn new(profiles: SignalConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            profiles,
            feed: None,
        }
    }

    /// Prefer `feed` for the eco index; synthetic values stand in when it fails.
    pub fn with_feed(mut self, feed: Box<dyn EcologicalFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn profiles(&self) -> &SignalConfig {
        &self.profiles
    }
}

impl SignalSource for SyntheticSignals {
    fn next_epoch(&mut self, epoch: EpochIndex) -> EpochSignals {
        // Synthetic eco is always drawn so throughput stays on the same stream
        let synthetic_eco = self.profiles.eco.sample(epoch, &mut self.rng);
        let fees = self.profiles.throughput.sample(epoch, &mut self.rng);

        let (eco_index, eco_source) = match self.feed.as_mut() {
            Some(feed) => {
                let reading = read_or_fallback(feed.as_mut(), epoch, synthetic_eco);
                (reading.value(), reading.source())
            }
            None => (synthetic_eco, EcoSource::Synthetic),
        };

        EpochSignals {
            fees,
            eco_index,
            eco_source,
        }
    }
}

/// Static traces replayed epoch by epoch
#[derive(Debug, Clone)]
pub struct ReplayedSignals {
    fees: Vec<f64>,
    eco: Vec<f64>,
    cursor: usize,
}

impl ReplayedSignals {
    pub fn new(fees: Vec<f64>, eco: Vec<f64>) -> Result<Self, MonetaryError> {
        if fees.is_empty() {
            return Err(MonetaryError::invalid("replayed trace is empty"));
        }
        if fees.len() != eco.len() {
            return Err(MonetaryError::invalid(format!(
                "replayed traces differ in length: {} fees vs {} eco",
                fees.len(),
                eco.len()
            )));
        }
        if fees.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(MonetaryError::invalid(
                "replayed fees must be finite and non-negative",
            ));
        }
        if eco.iter().any(|e| !e.is_finite()) {
            return Err(MonetaryError::invalid("replayed eco index must be finite"));
        }
        Ok(Self {
            fees,
            eco,
            cursor: 0,
        })
    }

    /// Constant eco index of 1 alongside the given fees
    pub fn from_fees(fees: Vec<f64>) -> Result<Self, MonetaryError> {
        let eco = vec![1.0; fees.len()];
        Self::new(fees, eco)
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }
}

impl SignalSource for ReplayedSignals {
    fn next_epoch(&mut self, _epoch: EpochIndex) -> EpochSignals {
        let i = self.cursor % self.fees.len();
        self.cursor = self.cursor.wrapping_add(1);
        EpochSignals {
            fees: self.fees[i],
            eco_index: self.eco[i],
            eco_source: EcoSource::Replayed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FeedError;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SyntheticSignals::new(SignalConfig::audit(), 42);
        let mut b = SyntheticSignals::new(SignalConfig::audit(), 42);
        for epoch in 0..50 {
            assert_eq!(a.next_epoch(epoch), b.next_epoch(epoch));
        }
    }

    #[test]
    fn test_different_seed_differs() {
        let mut a = SyntheticSignals::new(SignalConfig::audit(), 1);
        let mut b = SyntheticSignals::new(SignalConfig::audit(), 2);
        let differs = (0..10).any(|e| a.next_epoch(e) != b.next_epoch(e));
        assert!(differs);
    }

    #[test]
    fn test_floors_hold() {
        let mut s = SyntheticSignals::new(SignalConfig::audit(), 7);
        for epoch in 0..2000 {
            let sig = s.next_epoch(epoch);
            assert!(sig.eco_index >= 0.5);
            assert!(sig.fees >= 0.0);
            assert_eq!(sig.eco_source, EcoSource::Synthetic);
        }
    }

    #[test]
    fn test_noise_free_profile_is_seasonal() {
        let profile = SignalProfile {
            base: 100.0,
            seasonal_amplitude: 0.5,
            seasonal_period: 4.0,
            noise_std: 0.0,
            shock_probability: 0.0,
            shock_min: 1.0,
            shock_max: 1.0,
            floor: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let v = profile.sample(2, &mut rng);
        let expected = 100.0 * (1.0 + 0.5 * (0.5f64).sin());
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn test_certain_shock_scales_within_range() {
        let profile = SignalProfile {
            base: 10.0,
            seasonal_amplitude: 0.0,
            seasonal_period: 1.0,
            noise_std: 0.0,
            shock_probability: 1.0,
            shock_min: 0.4,
            shock_max: 0.8,
            floor: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(3);
        for epoch in 0..100 {
            let v = profile.sample(epoch, &mut rng);
            assert!((4.0..=8.0).contains(&v), "shocked value {v}");
        }
    }

    #[test]
    fn test_gaussian_moments() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let xs: Vec<f64> = (0..n).map(|_| gaussian(&mut rng, 1.0, 0.1)).collect();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!((mean - 1.0).abs() < 0.01);
        assert!((var.sqrt() - 0.1).abs() < 0.01);
    }

    #[test]
    fn test_replay_cycles() {
        let mut r = ReplayedSignals::new(vec![1.0, 2.0], vec![0.9, 1.1]).unwrap();
        let fees: Vec<f64> = (0..5).map(|e| r.next_epoch(e).fees).collect();
        assert_eq!(fees, vec![1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_replay_rejects_bad_traces() {
        assert!(ReplayedSignals::new(vec![], vec![]).is_err());
        assert!(ReplayedSignals::new(vec![1.0], vec![1.0, 1.0]).is_err());
        assert!(ReplayedSignals::new(vec![-1.0], vec![1.0]).is_err());
        assert!(ReplayedSignals::new(vec![1.0], vec![f64::NAN]).is_err());
    }

    struct BrokenFeed;

    impl EcologicalFeed for BrokenFeed {
        fn fetch(&mut self, _epoch: EpochIndex) -> Result<f64, FeedError> {
            Err(FeedError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_feed_failure_falls_back_without_shifting_stream() {
        let mut plain = SyntheticSignals::new(SignalConfig::audit(), 42);
        let mut fed =
            SyntheticSignals::new(SignalConfig::audit(), 42).with_feed(Box::new(BrokenFeed));
        for epoch in 0..20 {
            let a = plain.next_epoch(epoch);
            let b = fed.next_epoch(epoch);
            assert_eq!(a.fees, b.fees);
            assert_eq!(a.eco_index, b.eco_index);
            assert_eq!(b.eco_source, EcoSource::Fallback);
        }
    }
}
