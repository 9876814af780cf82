//! Snapshot reconciliation engine

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::types::*;

/// Options controlling what the engine materializes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Collect unchanged entries into [`DiffResult::unchanged`]
    pub materialize_unchanged: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            materialize_unchanged: true,
        }
    }
}

/// Compares two snapshots of one device's CAM table
///
/// Addresses are compared exactly as given. Normalizing them is the job of
/// ingestion, so `AA:..` and `aa:..` are different addresses here.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    options: ReconcileOptions,
}

impl ReconciliationEngine {
    /// Create an engine with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom options
    pub fn with_options(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Reconcile a pre-migration snapshot against a post-migration snapshot
    pub fn reconcile(&self, pre: &Snapshot, post: &Snapshot) -> DiffResult {
        let diff = self.reconcile_entries(pre.entries(), post.entries());
        let summary = diff.summary();
        debug!(
            device = %pre.device(),
            only_in_pre = summary.only_in_pre,
            only_in_post = summary.only_in_post,
            moved = summary.moved,
            unchanged = summary.unchanged,
            "reconciled snapshots"
        );
        diff
    }

    /// Reconcile two entry collections
    ///
    /// A repeated address within one collection resolves to its last
    /// occurrence and is reported once, at the position of its first
    /// occurrence.
    pub fn reconcile_entries(&self, pre: &[CamEntry], post: &[CamEntry]) -> DiffResult {
        let pre_index = index_by_address(pre);
        let post_index = index_by_address(post);
        let mut diff = DiffResult::default();

        let mut seen = HashSet::with_capacity(pre_index.len());
        for address in pre.iter().map(|entry| entry.address.as_str()) {
            if !seen.insert(address) {
                continue;
            }
            let Some(&before) = pre_index.get(address) else {
                continue;
            };

            match post_index.get(address) {
                None => diff.only_in_pre.push(before.clone()),
                Some(after) if after.port != before.port => diff.moved.push(MovedEntry::new(
                    before.address.clone(),
                    before.port.clone(),
                    after.port.clone(),
                )),
                Some(_) => {
                    if self.options.materialize_unchanged {
                        diff.unchanged.push(before.clone());
                    }
                }
            }
        }

        let mut seen = HashSet::with_capacity(post_index.len());
        for address in post.iter().map(|entry| entry.address.as_str()) {
            if pre_index.contains_key(address) || !seen.insert(address) {
                continue;
            }
            if let Some(&after) = post_index.get(address) {
                diff.only_in_post.push(after.clone());
            }
        }

        diff
    }
}

/// Reconcile two snapshots with default options
pub fn reconcile(pre: &Snapshot, post: &Snapshot) -> DiffResult {
    ReconciliationEngine::new().reconcile(pre, post)
}

/// Address index built by sequential insertion, so the last occurrence wins
fn index_by_address(entries: &[CamEntry]) -> HashMap<&str, &CamEntry> {
    let mut index = HashMap::with_capacity(entries.len());
    for entry in entries {
        index.insert(entry.address.as_str(), entry);
    }
    index
}
