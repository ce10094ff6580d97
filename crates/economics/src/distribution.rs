//! Budget-conserving integer allocation
//!
//! Splits an integer budget across weighted recipients so that the outputs sum
//! to the budget exactly:
//! - all-zero weights: even split, remainder to the first positions
//! - otherwise: floor each proportional share, then hand the leftover out one
//!   unit at a time by descending weight, ties broken by ascending index

use crate::errors::EconomicsError;
use crate::types::{Amount, RecipientPayout, WeightedRecipient};
use std::cmp::Ordering;
use tracing::debug;

/// Distribute `total` across `weights` deterministically.
///
/// The returned vector has the same length as `weights` and always sums to
/// `total`. Fails with [`EconomicsError::InvalidInput`] on negative or
/// non-finite weights, or when a non-zero budget has no recipients.
pub fn allocate(total: Amount, weights: &[f64]) -> Result<Vec<Amount>, EconomicsError> {
    validate_weights(weights)?;

    if weights.is_empty() {
        if total == 0 {
            return Ok(Vec::new());
        }
        return Err(EconomicsError::invalid(format!(
            "cannot allocate {total} across zero recipients"
        )));
    }

    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() {
        return Err(EconomicsError::invalid("weight sum is not finite"));
    }

    if sum == 0.0 {
        return Ok(even_split(total, weights.len()));
    }

    let mut shares: Vec<Amount> = weights
        .iter()
        .map(|w| floor_share(total, *w, sum))
        .collect();
    let order = remainder_order(weights);

    let floored: u128 = shares.iter().map(|s| u128::from(*s)).sum();
    let budget = u128::from(total);
    if floored > budget {
        // float rounding pushed a share past an integer boundary
        reclaim_excess(&mut shares, &order, floored - budget);
    } else {
        hand_out_leftover(&mut shares, &order, budget - floored);
    }

    debug!(
        target: "economics",
        "Allocated {} across {} recipients (leftover {})",
        total,
        weights.len(),
        budget.saturating_sub(floored)
    );
    debug_assert_eq!(shares.iter().map(|s| u128::from(*s)).sum::<u128>(), budget);
    Ok(shares)
}

/// Allocate `total` across named recipients, keeping their order.
pub fn allocate_to_recipients(
    total: Amount,
    recipients: &[WeightedRecipient],
) -> Result<Vec<RecipientPayout>, EconomicsError> {
    let weights: Vec<f64> = recipients.iter().map(|r| r.weight).collect();
    let payouts = allocate(total, &weights)?;

    Ok(recipients
        .iter()
        .zip(payouts)
        .map(|(r, payout)| RecipientPayout {
            id: r.id.clone(),
            weight: r.weight,
            payout,
        })
        .collect())
}

/// Indices ranked for leftover units: descending weight, then ascending index.
pub fn remainder_order(weights: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        weights[b]
            .partial_cmp(&weights[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

fn validate_weights(weights: &[f64]) -> Result<(), EconomicsError> {
    for (i, w) in weights.iter().enumerate() {
        if !w.is_finite() {
            return Err(EconomicsError::invalid(format!(
                "weight at index {i} is not finite"
            )));
        }
        if *w < 0.0 {
            return Err(EconomicsError::invalid(format!(
                "weight at index {i} is negative ({w})"
            )));
        }
    }
    Ok(())
}

fn even_split(total: Amount, n: usize) -> Vec<Amount> {
    let count = n as Amount;
    let base = total / count;
    let rem = (total % count) as usize;

    let mut out = vec![base; n];
    for slot in out.iter_mut().take(rem) {
        *slot += 1;
    }
    out
}

fn floor_share(total: Amount, weight: f64, sum: f64) -> Amount {
    let raw = total as f64 * (weight / sum);
    // float-to-int `as` truncates toward zero and saturates
    (raw as Amount).min(total)
}

fn hand_out_leftover(shares: &mut [Amount], order: &[usize], leftover: u128) {
    if leftover == 0 {
        return;
    }
    // cycling through the ranking == every slot gets `rounds`, the first `extra` one more
    let n = order.len() as u128;
    let rounds = (leftover / n) as Amount;
    let extra = (leftover % n) as usize;

    for (rank, &idx) in order.iter().enumerate() {
        shares[idx] += rounds;
        if rank < extra {
            shares[idx] += 1;
        }
    }
}

fn reclaim_excess(shares: &mut [Amount], order: &[usize], mut excess: u128) {
    while excess > 0 {
        let mut progressed = false;
        for &idx in order.iter().rev() {
            if excess == 0 {
                break;
            }
            if shares[idx] > 0 {
                shares[idx] -= 1;
                excess -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_weights_split_evenly() {
        let out = allocate(10, &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(out, vec![4, 3, 3]);

        let out = allocate(2, &[0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(out, vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_leftover_goes_to_highest_weight() {
        // raw shares 153.8, 169.2, 176.9 -> floors 153, 169, 176, leftover 2
        let out = allocate(500, &[1.0, 1.1, 1.15]).unwrap();
        assert_eq!(out, vec![153, 170, 177]);
        assert_eq!(out.iter().sum::<u64>(), 500);
    }

    #[test]
    fn test_equal_weights_tie_break_by_index() {
        let out = allocate(5, &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(out, vec![2, 2, 1]);
    }

    #[test]
    fn test_zero_weight_recipient_gets_nothing_unless_cycling() {
        let out = allocate(7, &[0.0, 2.0, 1.0]).unwrap();
        assert_eq!(out.iter().sum::<u64>(), 7);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn test_zero_total() {
        assert_eq!(allocate(0, &[1.0, 2.0]).unwrap(), vec![0, 0]);
        assert_eq!(allocate(0, &[]).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn test_rejects_invalid_weights() {
        assert!(matches!(
            allocate(10, &[1.0, -0.5]),
            Err(EconomicsError::InvalidInput(_))
        ));
        assert!(allocate(10, &[f64::NAN]).is_err());
        assert!(allocate(10, &[f64::INFINITY, 1.0]).is_err());
        assert!(allocate(10, &[f64::MAX, f64::MAX]).is_err());
        assert!(allocate(10, &[]).is_err());
    }

    #[test]
    fn test_remainder_order_ranks_by_weight_then_index() {
        assert_eq!(remainder_order(&[1.0, 3.0, 3.0, 2.0]), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_leftover_cycles_through_ranking() {
        let mut shares = vec![0, 0, 0];
        hand_out_leftover(&mut shares, &[2, 0, 1], 7);
        assert_eq!(shares, vec![2, 2, 3]);
    }

    #[test]
    fn test_reclaim_takes_from_lowest_rank_first() {
        let mut shares = vec![5, 5, 5];
        reclaim_excess(&mut shares, &[0, 1, 2], 2);
        assert_eq!(shares, vec![5, 4, 4]);
    }

    #[test]
    fn test_huge_budget_is_conserved() {
        let out = allocate(u64::MAX, &[1.0, 3.0, 7.0]).unwrap();
        let sum: u128 = out.iter().map(|v| u128::from(*v)).sum();
        assert_eq!(sum, u128::from(u64::MAX));
    }

    #[test]
    fn test_named_recipients_keep_order() {
        let recipients = vec![
            WeightedRecipient::new("a", 1.0),
            WeightedRecipient::new("b", 3.0),
        ];
        let payouts = allocate_to_recipients(8, &recipients).unwrap();
        assert_eq!(payouts[0].id, "a");
        assert_eq!(payouts[0].payout, 2);
        assert_eq!(payouts[1].payout, 6);
    }
}
