//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for captured snapshots
///
/// The pre snapshot is usually captured hours before the post snapshot, often
/// by a different process, so the check keeps them behind this trait. Any
/// backend (files, SQLite, object storage, in-memory) can implement it.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Save a snapshot, replacing any earlier snapshot of the same device and phase
    async fn save_snapshot(&mut self, snapshot: &Snapshot) -> ReconcileResult<()>;

    /// Get the snapshot of a device for a phase
    async fn get_snapshot(
        &self,
        device: &str,
        phase: SnapshotPhase,
    ) -> ReconcileResult<Option<Snapshot>>;

    /// List devices with at least one stored snapshot
    async fn list_devices(&self) -> ReconcileResult<Vec<String>>;

    /// Delete the snapshot of a device for a phase
    async fn delete_snapshot(&mut self, device: &str, phase: SnapshotPhase)
        -> ReconcileResult<()>;
}

/// Trait for implementing custom entry validation rules
pub trait EntryValidator: Send + Sync {
    /// Validate an entry before it is accepted into a snapshot
    fn validate_entry(&self, entry: &CamEntry) -> ReconcileResult<()>;
}

/// Default entry validator: address and port must be present
pub struct DefaultEntryValidator;

impl EntryValidator for DefaultEntryValidator {
    fn validate_entry(&self, entry: &CamEntry) -> ReconcileResult<()> {
        if entry.address.trim().is_empty() {
            return Err(ReconcileError::MalformedEntry(
                "Entry address cannot be empty".to_string(),
            ));
        }

        if entry.port.trim().is_empty() {
            return Err(ReconcileError::MalformedEntry(format!(
                "Entry for {} has an empty port",
                entry.address
            )));
        }

        Ok(())
    }
}
