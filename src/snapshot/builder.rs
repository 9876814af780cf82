//! Snapshot builder and duplicate resolution

use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::traits::*;
use crate::types::*;

/// Builder for validated, deduplicated snapshots
pub struct SnapshotBuilder {
    device: String,
    phase: SnapshotPhase,
    captured_at: Option<NaiveDateTime>,
    policy: DuplicatePolicy,
    validator: Box<dyn EntryValidator>,
    entries: Vec<CamEntry>,
}

impl SnapshotBuilder {
    /// Create a new snapshot builder
    pub fn new(device: impl Into<String>, phase: SnapshotPhase) -> Self {
        Self {
            device: device.into(),
            phase,
            captured_at: None,
            policy: DuplicatePolicy::default(),
            validator: Box::new(DefaultEntryValidator),
            entries: Vec::new(),
        }
    }

    /// Set the capture time (defaults to now)
    pub fn captured_at(mut self, captured_at: NaiveDateTime) -> Self {
        self.captured_at = Some(captured_at);
        self
    }

    /// Set the duplicate address policy
    pub fn policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the entry validator
    pub fn validator(mut self, validator: Box<dyn EntryValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Add an entry
    pub fn entry(mut self, entry: CamEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add entries in capture order
    pub fn entries(mut self, entries: impl IntoIterator<Item = CamEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Validate every entry, resolve duplicates and build the snapshot
    pub fn build(self) -> ReconcileResult<Snapshot> {
        if self.device.trim().is_empty() {
            return Err(ReconcileError::MalformedEntry(
                "Snapshot device name cannot be empty".to_string(),
            ));
        }

        for entry in &self.entries {
            self.validator.validate_entry(entry)?;
        }

        let (entries, duplicates) = deduplicate(self.entries, self.policy)?;
        debug!(
            device = %self.device,
            phase = %self.phase,
            entries = entries.len(),
            duplicates = duplicates.len(),
            "built snapshot"
        );

        Ok(Snapshot::from_parts(
            self.device,
            self.phase,
            self.captured_at
                .unwrap_or_else(|| chrono::Utc::now().naive_utc()),
            entries,
            duplicates,
        ))
    }
}

/// Resolve repeated addresses, keeping one entry per address
///
/// The kept entry takes the position of the first occurrence and the value of
/// the last one. Every replaced occurrence is returned as a
/// [`DuplicateAddress`]. Under [`DuplicatePolicy::Strict`] a repeat with a
/// different port is an error; a repeat on the same port is still accepted.
pub fn deduplicate(
    entries: Vec<CamEntry>,
    policy: DuplicatePolicy,
) -> ReconcileResult<(Vec<CamEntry>, Vec<DuplicateAddress>)> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(entries.len());
    let mut kept: Vec<CamEntry> = Vec::with_capacity(entries.len());
    let mut duplicates = Vec::new();

    for entry in entries {
        let Some(&position) = positions.get(&entry.address) else {
            positions.insert(entry.address.clone(), kept.len());
            kept.push(entry);
            continue;
        };

        let previous = &kept[position];
        if policy == DuplicatePolicy::Strict && previous.port != entry.port {
            return Err(ReconcileError::ConflictingDuplicateAddress {
                address: entry.address,
                first_port: previous.port.clone(),
                second_port: entry.port,
            });
        }

        warn!(
            address = %entry.address,
            discarded_port = %previous.port,
            kept_port = %entry.port,
            "duplicate address in snapshot, keeping last seen"
        );
        duplicates.push(DuplicateAddress {
            address: entry.address.clone(),
            discarded_port: previous.port.clone(),
            kept_port: entry.port.clone(),
        });
        kept[position] = entry;
    }

    Ok((kept, duplicates))
}
