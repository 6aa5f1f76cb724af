//! Pricing abstractions

use super::asset::AssetId;
use super::error::Result;
use async_trait::async_trait;
use primitive_types::U256;

/// Supplies the latest 18-decimal fixed-point price of an asset.
///
/// Implementations fail with `IndexError::PriceUnavailable` when the asset
/// cannot be priced; they must never substitute zero or a stale value.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn get_price(&self, asset: &AssetId) -> Result<U256>;
}
