//! Holdings abstractions

use super::asset::AssetId;
use super::error::Result;
use async_trait::async_trait;
use primitive_types::U256;

/// Supplies the quantity of an asset currently held by the portfolio.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance_of(&self, asset: &AssetId) -> Result<U256>;
}
