//! Core types and data structures for CAM table reconciliation

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Point in a migration at which a snapshot was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPhase {
    /// Captured before the migration
    Pre,
    /// Captured after the migration
    Post,
}

impl SnapshotPhase {
    /// Lowercase name used in logs and storage keys
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotPhase::Pre => "pre",
            SnapshotPhase::Post => "post",
        }
    }

    /// The phase a snapshot of this phase is compared against
    pub fn opposite(&self) -> Self {
        match self {
            SnapshotPhase::Pre => SnapshotPhase::Post,
            SnapshotPhase::Post => SnapshotPhase::Pre,
        }
    }
}

impl fmt::Display for SnapshotPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How repeated addresses within one snapshot are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the last occurrence and record the discarded one
    #[default]
    LastSeenWins,
    /// Reject a snapshot where one address is learned on two different ports
    Strict,
}

/// Fields carried alongside an entry but never compared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CamMetadata {
    /// VLAN the address was learned in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<String>,
    /// Learning type reported by the device (DYNAMIC, STATIC, ...)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    /// Any other fields the upstream parser emitted
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

impl CamMetadata {
    /// True when no metadata was captured
    pub fn is_empty(&self) -> bool {
        self.vlan.is_none() && self.entry_type.is_none() && self.extra.is_empty()
    }
}

/// One row of a forwarding table at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CamEntry {
    /// MAC address, lowercase and colon-delimited
    pub address: String,
    /// Interface the address was learned on
    pub port: String,
    /// Pass-through fields, not part of equality during reconciliation
    #[serde(default, skip_serializing_if = "CamMetadata::is_empty")]
    pub metadata: CamMetadata,
}

impl CamEntry {
    /// Create an entry from an already normalized address
    pub fn new(address: String, port: String) -> Self {
        Self {
            address,
            port,
            metadata: CamMetadata::default(),
        }
    }

    /// Create an entry from raw device text, normalizing the address and
    /// trimming the port
    pub fn parse(address: &str, port: &str) -> ReconcileResult<Self> {
        let address = crate::utils::normalize_mac(address)?;
        crate::utils::validate_port(port)?;
        Ok(Self::new(address, port.trim().to_string()))
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: CamMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach a VLAN
    pub fn with_vlan(mut self, vlan: impl Into<String>) -> Self {
        self.metadata.vlan = Some(vlan.into());
        self
    }
}

/// A repeated address resolved while building a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateAddress {
    pub address: String,
    /// Port of the earlier occurrence that was replaced
    pub discarded_port: String,
    /// Port of the later occurrence that was kept
    pub kept_port: String,
}

/// CAM table of one device captured at one instant
///
/// Addresses are unique within a snapshot. Build one with
/// [`SnapshotBuilder`](crate::snapshot::SnapshotBuilder). Deserialized
/// snapshots go through the same validation and duplicate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct Snapshot {
    id: Uuid,
    device: String,
    phase: SnapshotPhase,
    captured_at: NaiveDateTime,
    entries: Vec<CamEntry>,
    duplicates: Vec<DuplicateAddress>,
}

/// Stored form of a [`Snapshot`] before it is checked
#[derive(Deserialize)]
struct SnapshotRecord {
    id: Uuid,
    device: String,
    phase: SnapshotPhase,
    captured_at: NaiveDateTime,
    entries: Vec<CamEntry>,
    #[serde(default)]
    duplicates: Vec<DuplicateAddress>,
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = ReconcileError;

    fn try_from(record: SnapshotRecord) -> ReconcileResult<Self> {
        let mut snapshot = crate::snapshot::SnapshotBuilder::new(record.device, record.phase)
            .captured_at(record.captured_at)
            .entries(record.entries)
            .build()?;

        // keep the stored identity and the repeats resolved at capture time
        let mut duplicates = record.duplicates;
        duplicates.append(&mut snapshot.duplicates);
        snapshot.id = record.id;
        snapshot.duplicates = duplicates;
        Ok(snapshot)
    }
}

impl Snapshot {
    pub(crate) fn from_parts(
        device: String,
        phase: SnapshotPhase,
        captured_at: NaiveDateTime,
        entries: Vec<CamEntry>,
        duplicates: Vec<DuplicateAddress>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            device,
            phase,
            captured_at,
            entries,
            duplicates,
        }
    }

    /// Build a snapshot with the default duplicate policy and validator
    pub fn from_entries(
        device: impl Into<String>,
        phase: SnapshotPhase,
        entries: Vec<CamEntry>,
    ) -> ReconcileResult<Self> {
        crate::snapshot::SnapshotBuilder::new(device, phase)
            .entries(entries)
            .build()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn phase(&self) -> SnapshotPhase {
        self.phase
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    /// Entries in capture order
    pub fn entries(&self) -> &[CamEntry] {
        &self.entries
    }

    /// Duplicates resolved by last-seen-wins while building the snapshot
    pub fn duplicates(&self) -> &[DuplicateAddress] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An address seen in both snapshots on different ports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovedEntry {
    pub address: String,
    pub old_port: String,
    pub new_port: String,
}

impl MovedEntry {
    pub fn new(address: String, old_port: String, new_port: String) -> Self {
        Self {
            address,
            old_port,
            new_port,
        }
    }

    /// The same move seen from the other direction
    pub fn reversed(&self) -> Self {
        Self::new(
            self.address.clone(),
            self.new_port.clone(),
            self.old_port.clone(),
        )
    }
}

/// Outcome of reconciling a pre and a post snapshot
///
/// `only_in_pre`, `moved` and `unchanged` follow the order of the pre input,
/// `only_in_post` the order of the post input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// Addresses learned before the migration but not after
    pub only_in_pre: Vec<CamEntry>,
    /// Addresses learned after the migration but not before
    pub only_in_post: Vec<CamEntry>,
    /// Addresses learned on a different port after the migration
    pub moved: Vec<MovedEntry>,
    /// Addresses learned on the same port in both snapshots
    #[serde(default)]
    pub unchanged: Vec<CamEntry>,
}

impl DiffResult {
    /// True when the migration preserved the table exactly
    pub fn is_clean(&self) -> bool {
        self.only_in_pre.is_empty() && self.only_in_post.is_empty() && self.moved.is_empty()
    }

    /// Bucket sizes
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            only_in_pre: self.only_in_pre.len(),
            only_in_post: self.only_in_post.len(),
            moved: self.moved.len(),
            unchanged: self.unchanged.len(),
        }
    }

    /// Swap the only-in buckets and the ports of every move.
    ///
    /// `unchanged` keeps the pre-side entries, so this matches a reverse
    /// reconciliation only when unchanged entries carry the same metadata on
    /// both sides.
    pub fn inverted(&self) -> Self {
        Self {
            only_in_pre: self.only_in_post.clone(),
            only_in_post: self.only_in_pre.clone(),
            moved: self.moved.iter().map(MovedEntry::reversed).collect(),
            unchanged: self.unchanged.clone(),
        }
    }
}

/// Bucket sizes of a [`DiffResult`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub only_in_pre: usize,
    pub only_in_post: usize,
    pub moved: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    /// Number of addresses that differ between the snapshots
    pub fn drift(&self) -> usize {
        self.only_in_pre + self.only_in_post + self.moved
    }
}

/// Errors that can occur while building snapshots or running a check
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Malformed entry: {0}")]
    MalformedEntry(String),
    #[error("Conflicting duplicate address {address}: learned on {first_port} and {second_port}")]
    ConflictingDuplicateAddress {
        address: String,
        first_port: String,
        second_port: String,
    },
    #[error("Snapshot not found: no {phase} snapshot for device {device}")]
    SnapshotNotFound {
        device: String,
        phase: SnapshotPhase,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
