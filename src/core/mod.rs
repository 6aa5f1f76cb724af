//! Valuation, rebalancing and share bookkeeping for a weighted index

pub mod asset;
pub mod balance;
pub mod config;
pub mod error;
pub mod fixed;
pub mod index;
pub mod ledger;
pub mod log;
pub mod price;
pub mod rebalance;
pub mod snapshot;
pub mod valuation;

// Re-export main types for cleaner imports
pub use asset::{AssetEntry, AssetId, Holder, PortfolioState};
pub use balance::BalanceSource;
pub use error::IndexError;
pub use index::{IndexBuilder, InitialWeights, WeightedIndex};
pub use ledger::ShareLedger;
pub use price::PriceSource;
pub use rebalance::RemainderPolicy;
pub use snapshot::{IndexSnapshot, StateStore};
