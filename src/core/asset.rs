//! Portfolio state: registered assets, their weights and cached prices.

use super::error::{IndexError, Result};
use super::fixed::BPS_DENOMINATOR;
use chrono::{DateTime, Utc};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;

/// Opaque asset identifier, e.g. a ticker or a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identity of an index share holder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Holder(String);

impl Holder {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Holder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Holder {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub asset: AssetId,
    /// Basis points, 0..=10000.
    pub weight: u16,
    /// 18-decimal fixed point, zero until the first refresh.
    pub cached_price: U256,
}

/// Ordered asset entries plus a revision bumped by every price refresh and
/// rebalance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioState {
    entries: Vec<AssetEntry>,
    revision: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

impl PortfolioState {
    /// Registers `assets` with explicit initial weights that must sum to
    /// exactly 10000 basis points.
    pub fn with_weights(assets: Vec<AssetId>, weights: Vec<u16>) -> Result<Self> {
        if assets.len() != weights.len() {
            return Err(IndexError::InvalidConfiguration(format!(
                "{} assets but {} weights",
                assets.len(),
                weights.len()
            )));
        }
        validate_assets(&assets)?;
        validate_full_allocation(&weights)?;

        let entries = assets
            .into_iter()
            .zip(weights)
            .map(|(asset, weight)| AssetEntry {
                asset,
                weight,
                cached_price: U256::zero(),
            })
            .collect();
        Ok(Self {
            entries,
            revision: 0,
            refreshed_at: None,
        })
    }

    /// Registers `assets` with zero weights, to be derived by a first
    /// refresh and rebalance.
    pub fn unweighted(assets: Vec<AssetId>) -> Result<Self> {
        validate_assets(&assets)?;
        let entries = assets
            .into_iter()
            .map(|asset| AssetEntry {
                asset,
                weight: 0,
                cached_price: U256::zero(),
            })
            .collect();
        Ok(Self {
            entries,
            revision: 0,
            refreshed_at: None,
        })
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetId> {
        self.entries.iter().map(|e| &e.asset)
    }

    pub fn weights(&self) -> Vec<u16> {
        self.entries.iter().map(|e| e.weight).collect()
    }

    pub fn prices(&self) -> Vec<U256> {
        self.entries.iter().map(|e| e.cached_price).collect()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn weight_sum(&self) -> u32 {
        self.entries.iter().map(|e| u32::from(e.weight)).sum()
    }

    /// Returns the next state with every cached price replaced. `prices`
    /// follows entry order.
    pub fn with_prices(&self, prices: Vec<U256>, at: DateTime<Utc>) -> Result<Self> {
        if prices.len() != self.entries.len() {
            return Err(IndexError::InvalidConfiguration(format!(
                "expected {} prices, got {}",
                self.entries.len(),
                prices.len()
            )));
        }
        let mut next = self.clone();
        for (entry, price) in next.entries.iter_mut().zip(prices) {
            entry.cached_price = price;
        }
        next.revision += 1;
        next.refreshed_at = Some(at);
        Ok(next)
    }

    /// Returns the next state with every weight replaced. `weights` follows
    /// entry order.
    pub fn with_new_weights(&self, weights: Vec<u16>) -> Result<Self> {
        if weights.len() != self.entries.len() {
            return Err(IndexError::InvalidConfiguration(format!(
                "expected {} weights, got {}",
                self.entries.len(),
                weights.len()
            )));
        }
        if let Some(w) = weights.iter().find(|w| **w > BPS_DENOMINATOR) {
            return Err(IndexError::InvalidConfiguration(format!(
                "weight {w} exceeds {BPS_DENOMINATOR} basis points"
            )));
        }
        let mut next = self.clone();
        for (entry, weight) in next.entries.iter_mut().zip(weights) {
            entry.weight = weight;
        }
        next.revision += 1;
        Ok(next)
    }

    /// Like [`Self::with_new_weights`], but the weights are set by hand and
    /// must allocate exactly 10000 basis points.
    pub fn with_assigned_weights(&self, weights: Vec<u16>) -> Result<Self> {
        if weights.len() == self.entries.len() {
            validate_full_allocation(&weights)?;
        }
        self.with_new_weights(weights)
    }
}

/// Weights of a non-empty portfolio must sum to exactly 10000.
fn validate_full_allocation(weights: &[u16]) -> Result<()> {
    if weights.is_empty() {
        return Ok(());
    }
    let sum: u32 = weights.iter().map(|w| u32::from(*w)).sum();
    if sum != u32::from(BPS_DENOMINATOR) {
        return Err(IndexError::InvalidConfiguration(format!(
            "weights sum to {sum}, expected {BPS_DENOMINATOR}"
        )));
    }
    Ok(())
}

fn validate_assets(assets: &[AssetId]) -> Result<()> {
    let mut seen = HashSet::new();
    for asset in assets {
        if !seen.insert(asset) {
            return Err(IndexError::InvalidConfiguration(format!(
                "asset {asset} is registered twice"
            )));
        }
    }
    Ok(())
}
