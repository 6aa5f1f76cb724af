//! Value-driven reweighting.
//!
//! Each weight becomes the asset's share of total value, floored to whole
//! basis points. Callers are expected to refresh prices first; nothing here
//! pulls prices or checks their age.

use super::asset::PortfolioState;
use super::error::{IndexError, Result};
use super::fixed::{self, BPS_DENOMINATOR};
use super::valuation;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What happens to basis points lost to floor division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Keep the shortfall; the weight sum may end up to N-1 below 10000.
    #[default]
    Floor,
    /// Give the shortfall to the asset with the largest value contribution
    /// (first one on ties), so weights sum to exactly 10000.
    LargestValue,
}

/// Derives basis-point weights from raw value contributions.
pub fn compute_weights(contributions: &[U256], policy: RemainderPolicy) -> Result<Vec<u16>> {
    let mut total = U256::zero();
    for value in contributions {
        total = fixed::checked_add(total, *value, "rebalance")?;
    }
    if total.is_zero() {
        return Err(IndexError::UndefinedRebalance);
    }

    let denominator = U256::from(BPS_DENOMINATOR);
    let mut weights = contributions
        .iter()
        .map(|value| {
            let weight = fixed::mul_div_floor(*value, denominator, total, "rebalance")?;
            u16::try_from(weight.low_u64())
                .map_err(|_| IndexError::ArithmeticOverflow("rebalance"))
        })
        .collect::<Result<Vec<u16>>>()?;

    if policy == RemainderPolicy::LargestValue {
        let assigned: u16 = weights.iter().sum();
        let remainder = BPS_DENOMINATOR - assigned;
        if remainder > 0 {
            let largest = largest_index(contributions);
            weights[largest] += remainder;
            debug!(remainder, index = largest, "Assigned rounding remainder");
        }
    }
    Ok(weights)
}

/// Returns the rebalanced next state. `balances` follows entry order.
pub fn rebalanced(
    state: &PortfolioState,
    balances: &[U256],
    policy: RemainderPolicy,
) -> Result<PortfolioState> {
    let contributions = valuation::value_contributions(state.entries(), balances)?;
    let weights = compute_weights(&contributions, policy)?;
    state.with_new_weights(weights)
}

fn largest_index(values: &[U256]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = i;
        }
    }
    best
}
