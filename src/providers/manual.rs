//! Fixed price and balance tables, typically read from the configuration
//! file.

use crate::core::asset::AssetId;
use crate::core::balance::BalanceSource;
use crate::core::error::{IndexError, Result};
use crate::core::price::PriceSource;
use async_trait::async_trait;
use primitive_types::U256;
use std::collections::HashMap;
use tracing::debug;

/// Prices entered by hand. Assets without an entry cannot be priced.
#[derive(Debug, Clone, Default)]
pub struct ManualPriceSource {
    prices: HashMap<AssetId, U256>,
}

impl ManualPriceSource {
    pub fn new(prices: HashMap<AssetId, U256>) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl PriceSource for ManualPriceSource {
    async fn get_price(&self, asset: &AssetId) -> Result<U256> {
        let price = self
            .prices
            .get(asset)
            .copied()
            .ok_or_else(|| IndexError::PriceUnavailable {
                asset: asset.clone(),
                reason: "no manual price configured".to_string(),
            })?;
        debug!(%asset, %price, "Manual price");
        Ok(price)
    }
}

/// Holdings entered by hand. Assets without an entry hold nothing.
#[derive(Debug, Clone, Default)]
pub struct ManualBalanceSource {
    balances: HashMap<AssetId, U256>,
}

impl ManualBalanceSource {
    pub fn new(balances: HashMap<AssetId, U256>) -> Self {
        Self { balances }
    }
}

#[async_trait]
impl BalanceSource for ManualBalanceSource {
    async fn balance_of(&self, asset: &AssetId) -> Result<U256> {
        Ok(self.balances.get(asset).copied().unwrap_or_default())
    }
}
