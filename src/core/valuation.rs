//! Weighted valuation of a portfolio from cached prices and balances.

use super::asset::AssetEntry;
use super::error::{IndexError, Result};
use super::fixed::{self, BPS_DENOMINATOR};
use primitive_types::U256;
use tracing::debug;

/// Raw value contribution `price * balance` of each entry, before weighting.
///
/// `balances` follows entry order.
pub fn value_contributions(entries: &[AssetEntry], balances: &[U256]) -> Result<Vec<U256>> {
    ensure_aligned(entries, balances)?;
    entries
        .iter()
        .zip(balances)
        .map(|(entry, balance)| {
            fixed::checked_mul(entry.cached_price, *balance, "value contribution")
        })
        .collect()
}

/// Computes `Σ floor(cached_price * balance * weight / 10000)`.
///
/// Each term is floored on its own before summing. The result carries the
/// price decimals plus the balance decimals.
pub fn index_value(entries: &[AssetEntry], balances: &[U256]) -> Result<U256> {
    ensure_aligned(entries, balances)?;
    let denominator = U256::from(BPS_DENOMINATOR);
    let mut total = U256::zero();
    for (entry, balance) in entries.iter().zip(balances) {
        if entry.weight == 0 || entry.cached_price.is_zero() || balance.is_zero() {
            continue;
        }
        let value = fixed::checked_mul(entry.cached_price, *balance, "valuation")?;
        let contribution =
            fixed::mul_div_floor(value, U256::from(entry.weight), denominator, "valuation")?;
        debug!(asset = %entry.asset, %contribution, "Weighted contribution");
        total = fixed::checked_add(total, contribution, "valuation")?;
    }
    Ok(total)
}

fn ensure_aligned(entries: &[AssetEntry], balances: &[U256]) -> Result<()> {
    if entries.len() != balances.len() {
        return Err(IndexError::InvalidConfiguration(format!(
            "expected {} balances, got {}",
            entries.len(),
            balances.len()
        )));
    }
    Ok(())
}
