//! Authority compensation for a single epoch
//!
//! Routes the epoch's fees into validator, burn and community pools, then
//! splits the validator pool across authorities weighted by `1 + bonus`.
//! The payout sum always equals the validator pool.

use crate::distribution::allocate;
use crate::errors::EconomicsError;
use crate::types::{
    AllocationConfig, AllocationOutcome, AllocationScenario, Amount, Authority, AuthorityPayout,
    ExpectedOutcome, FRACTION_EPSILON,
};
use tracing::{debug, info};

impl AllocationConfig {
    /// Reject configurations that would double-spend or leak fees.
    pub fn validate(&self) -> Result<(), EconomicsError> {
        if self.fee_total < 0 {
            return Err(EconomicsError::invalid(format!(
                "fee_total must be non-negative, got {}",
                self.fee_total
            )));
        }
        check_fraction("validator_fraction", self.validator_fraction)?;
        check_fraction("burn_fraction", self.burn_fraction)?;
        if self.validator_fraction + self.burn_fraction > 1.0 + FRACTION_EPSILON {
            return Err(EconomicsError::invalid(format!(
                "validator_fraction + burn_fraction must be <= 1 (got {} + {})",
                self.validator_fraction, self.burn_fraction
            )));
        }
        if !self.beta_max.is_finite() || self.beta_max < 0.0 {
            return Err(EconomicsError::invalid(format!(
                "beta_max must be a non-negative number, got {}",
                self.beta_max
            )));
        }
        Ok(())
    }

    /// Bonus clamped into `[0, beta_max]`
    pub fn clamp_bonus(&self, bonus: f64) -> f64 {
        if bonus.is_nan() {
            return 0.0;
        }
        bonus.clamp(0.0, self.beta_max)
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), EconomicsError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EconomicsError::invalid(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Split one epoch's fees across pools and authorities.
pub fn simulate_epoch(
    config: &AllocationConfig,
    authorities: &[Authority],
) -> Result<AllocationOutcome, EconomicsError> {
    config.validate()?;

    let fee_total = config.fee_total as Amount;
    let validator_pool = pool_share(fee_total, config.validator_fraction);
    let burn_pool = pool_share(fee_total, config.burn_fraction);
    // validation bounds the two fractions, the clamp absorbs float slack at exactly 1.0
    let burn_pool = burn_pool.min(fee_total - validator_pool);
    let community_pool = fee_total - validator_pool - burn_pool;

    let betas: Vec<f64> = authorities
        .iter()
        .map(|a| config.clamp_bonus(a.bonus_beta))
        .collect();
    let weights: Vec<f64> = betas.iter().map(|b| 1.0 + b).collect();
    let payouts = allocate(validator_pool, &weights)?;
    let payout_sum: Amount = payouts.iter().sum();

    let lines = authorities
        .iter()
        .zip(betas.iter().zip(weights.iter()))
        .zip(payouts.iter())
        .map(|((a, (beta, weight)), payout)| AuthorityPayout {
            authority_id: a.authority_id.clone(),
            beta: *beta,
            weight: *weight,
            payout: *payout,
        })
        .collect();

    info!(
        target: "economics",
        "Epoch fees {}: validator={} burn={} community={} across {} authorities",
        fee_total,
        validator_pool,
        burn_pool,
        community_pool,
        authorities.len()
    );

    Ok(AllocationOutcome {
        fee_total,
        validator_pool,
        burn_pool,
        community_pool,
        authorities: lines,
        payout_sum,
    })
}

/// Run a scenario file's configuration against its authority set.
pub fn run_scenario(scenario: &AllocationScenario) -> Result<AllocationOutcome, EconomicsError> {
    simulate_epoch(&scenario.config, &scenario.authorities)
}

fn pool_share(total: Amount, fraction: f64) -> Amount {
    ((total as f64 * fraction) as Amount).min(total)
}

impl AllocationOutcome {
    /// Payout for a given authority, if present
    pub fn payout_of(&self, authority_id: &str) -> Option<Amount> {
        self.authorities
            .iter()
            .find(|a| a.authority_id == authority_id)
            .map(|a| a.payout)
    }

    /// Compare against the expectations bundled with a scenario file.
    ///
    /// Returns the list of mismatches; empty means the outcome matches.
    pub fn mismatches(&self, expected: &ExpectedOutcome) -> Vec<String> {
        let mut issues = Vec::new();

        let pools = [
            ("validator_pool", self.validator_pool, expected.validator_pool),
            ("burn_pool", self.burn_pool, expected.burn_pool),
            ("community_pool", self.community_pool, expected.community_pool),
        ];
        for (name, got, want) in pools {
            if got != want {
                issues.push(format!("{name}: expected {want}, got {got}"));
            }
        }
        if self.payout_sum != expected.validator_pool {
            issues.push(format!(
                "payout_sum: expected {}, got {}",
                expected.validator_pool, self.payout_sum
            ));
        }
        for (id, want) in &expected.payouts_by_authority {
            match self.payout_of(id) {
                Some(got) if got == *want => {}
                Some(got) => issues.push(format!("payout[{id}]: expected {want}, got {got}")),
                None => issues.push(format!("payout[{id}]: authority missing")),
            }
        }

        debug!(target: "economics", "Scenario check found {} mismatches", issues.len());
        issues
    }

    pub fn matches(&self, expected: &ExpectedOutcome) -> bool {
        self.mismatches(expected).is_empty()
    }
}
