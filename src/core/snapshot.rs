//! Persistable index state and the storage abstraction behind it.

use super::asset::PortfolioState;
use super::error::Result;
use super::ledger::ShareLedger;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything that must survive between operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub portfolio: PortfolioState,
    pub ledger: ShareLedger,
}

/// Durable home for the latest [`IndexSnapshot`].
///
/// `save` must either store the whole snapshot or fail; the index only
/// commits a transition in memory after it was saved.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<Option<IndexSnapshot>>;
    async fn save(&self, snapshot: &IndexSnapshot) -> Result<()>;
}
