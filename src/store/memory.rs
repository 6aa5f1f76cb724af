use crate::core::error::Result;
use crate::core::snapshot::{IndexSnapshot, StateStore};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store; state lives as long as the process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Option<IndexSnapshot>>>,
}

impl MemoryStore {
    /// Creates a new, empty MemoryStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a MemoryStore that already holds `snapshot`
    pub fn with_snapshot(snapshot: IndexSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(snapshot))),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Option<IndexSnapshot>> {
        let stored = self.inner.lock().await;
        debug!(found = stored.is_some(), "Memory store LOAD");
        Ok(stored.clone())
    }

    async fn save(&self, snapshot: &IndexSnapshot) -> Result<()> {
        let mut stored = self.inner.lock().await;
        debug!(revision = snapshot.portfolio.revision(), "Memory store SAVE");
        *stored = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::{AssetId, PortfolioState};
    use crate::core::ledger::ShareLedger;

    fn snapshot() -> IndexSnapshot {
        IndexSnapshot {
            portfolio: PortfolioState::with_weights(vec![AssetId::from("TK1")], vec![10_000])
                .unwrap(),
            ledger: ShareLedger::new(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_load_save() {
        let store = MemoryStore::new();

        // Initially, store is empty
        assert!(store.load().await.unwrap().is_none());

        store.save(&snapshot()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(snapshot()));
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.save(&snapshot()).await.unwrap();
        assert!(other.load().await.unwrap().is_some());
    }
}
