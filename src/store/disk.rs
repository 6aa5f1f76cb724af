use crate::core::error::{IndexError, Result};
use crate::core::snapshot::{IndexSnapshot, StateStore};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "index";
const SNAPSHOT_KEY: &str = "snapshot";

/// Fjall-backed store keeping the latest snapshot as JSON.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(db_path)?;

        let keyspace = Config::new(db_path.join("fjall_db")).open()?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened disk store at {}", db_path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

fn storage_error(e: impl std::fmt::Display) -> IndexError {
    IndexError::Storage(e.to_string())
}

#[async_trait]
impl StateStore for DiskStore {
    async fn load(&self) -> Result<Option<IndexSnapshot>> {
        match self.partition.get(SNAPSHOT_KEY).map_err(storage_error)? {
            Some(value) => {
                let snapshot: IndexSnapshot =
                    serde_json::from_slice(&value).map_err(storage_error)?;
                debug!(revision = snapshot.portfolio.revision(), "Disk store HIT");
                Ok(Some(snapshot))
            }
            None => {
                debug!("Disk store MISS");
                Ok(None)
            }
        }
    }

    async fn save(&self, snapshot: &IndexSnapshot) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot).map_err(storage_error)?;
        self.partition
            .insert(SNAPSHOT_KEY, bytes)
            .map_err(storage_error)?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(storage_error)?;
        debug!(revision = snapshot.portfolio.revision(), "Disk store SAVE");
        Ok(())
    }
}
