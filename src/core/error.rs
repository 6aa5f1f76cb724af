use super::asset::{AssetId, Holder};
use primitive_types::U256;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

/// Failures of index operations. None of them leave partial writes behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Price unavailable for {asset}: {reason}")]
    PriceUnavailable { asset: AssetId, reason: String },

    #[error("Balance unavailable for {asset}: {reason}")]
    BalanceUnavailable { asset: AssetId, reason: String },

    #[error("Arithmetic overflow during {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Cannot rebalance a portfolio with zero total value")]
    UndefinedRebalance,

    #[error("Insufficient balance for {holder}: requested {requested}, available {available}")]
    InsufficientBalance {
        holder: Holder,
        requested: U256,
        available: U256,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
