//! In-memory snapshot store for testing

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

type SnapshotKey = (String, SnapshotPhase);

/// In-memory snapshot store for testing and development
#[derive(Debug, Clone)]
pub struct MemorySnapshotStore {
    snapshots: Arc<RwLock<HashMap<SnapshotKey, Snapshot>>>,
}

impl MemorySnapshotStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> ReconcileResult<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Number of stored snapshots
    pub fn len(&self) -> ReconcileResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> ReconcileResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> ReconcileResult<RwLockReadGuard<'_, HashMap<SnapshotKey, Snapshot>>> {
        self.snapshots
            .read()
            .map_err(|_| ReconcileError::Storage("snapshot store lock poisoned".to_string()))
    }

    fn write(&self) -> ReconcileResult<RwLockWriteGuard<'_, HashMap<SnapshotKey, Snapshot>>> {
        self.snapshots
            .write()
            .map_err(|_| ReconcileError::Storage("snapshot store lock poisoned".to_string()))
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save_snapshot(&mut self, snapshot: &Snapshot) -> ReconcileResult<()> {
        self.write()?.insert(
            (snapshot.device().to_string(), snapshot.phase()),
            snapshot.clone(),
        );
        Ok(())
    }

    async fn get_snapshot(
        &self,
        device: &str,
        phase: SnapshotPhase,
    ) -> ReconcileResult<Option<Snapshot>> {
        Ok(self.read()?.get(&(device.to_string(), phase)).cloned())
    }

    async fn list_devices(&self) -> ReconcileResult<Vec<String>> {
        let devices: BTreeSet<String> = self
            .read()?
            .keys()
            .map(|(device, _)| device.clone())
            .collect();
        Ok(devices.into_iter().collect())
    }

    async fn delete_snapshot(
        &mut self,
        device: &str,
        phase: SnapshotPhase,
    ) -> ReconcileResult<()> {
        if self.write()?.remove(&(device.to_string(), phase)).is_some() {
            Ok(())
        } else {
            Err(ReconcileError::SnapshotNotFound {
                device: device.to_string(),
                phase,
            })
        }
    }
}
