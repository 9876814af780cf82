//! Migration report built from a reconciliation result

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::*;

/// Reconciliation result together with the snapshots it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub device: String,
    pub pre_snapshot_id: Uuid,
    pub post_snapshot_id: Uuid,
    pub pre_captured_at: NaiveDateTime,
    pub post_captured_at: NaiveDateTime,
    pub summary: DiffSummary,
    pub is_clean: bool,
    pub diff: DiffResult,
}

impl DiffReport {
    pub fn new(pre: &Snapshot, post: &Snapshot, diff: DiffResult) -> Self {
        Self {
            device: pre.device().to_string(),
            pre_snapshot_id: pre.id(),
            post_snapshot_id: post.id(),
            pre_captured_at: pre.captured_at(),
            post_captured_at: post.captured_at(),
            summary: diff.summary(),
            is_clean: diff.is_clean(),
            diff,
        }
    }

    /// Render as pretty-printed JSON
    pub fn to_json_pretty(&self) -> ReconcileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} only before, {} only after, {} moved, {} unchanged",
            self.device,
            self.summary.only_in_pre,
            self.summary.only_in_post,
            self.summary.moved,
            self.summary.unchanged
        )?;

        if self.is_clean {
            return writeln!(f, "  no CAM table drift detected");
        }

        for entry in &self.diff.only_in_pre {
            writeln!(f, "  - {}  {}", entry.address, entry.port)?;
        }
        for entry in &self.diff.only_in_post {
            writeln!(f, "  + {}  {}", entry.address, entry.port)?;
        }
        for moved in &self.diff.moved {
            writeln!(
                f,
                "  ~ {}  {} -> {}",
                moved.address, moved.old_port, moved.new_port
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::reconcile;

    fn snapshot(phase: SnapshotPhase, entries: &[(&str, &str)]) -> Snapshot {
        Snapshot::from_entries(
            "sw1",
            phase,
            entries
                .iter()
                .map(|(address, port)| CamEntry::new(address.to_string(), port.to_string()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_report_display() {
        let pre = snapshot(
            SnapshotPhase::Pre,
            &[
                ("aa:aa:aa:aa:aa:aa", "Gi1/0/1"),
                ("bb:bb:bb:bb:bb:bb", "Gi1/0/2"),
            ],
        );
        let post = snapshot(
            SnapshotPhase::Post,
            &[
                ("aa:aa:aa:aa:aa:aa", "Gi1/0/5"),
                ("cc:cc:cc:cc:cc:cc", "Gi1/0/3"),
            ],
        );

        let report = DiffReport::new(&pre, &post, reconcile(&pre, &post));
        assert_eq!(report.pre_snapshot_id, pre.id());
        assert_eq!(report.post_snapshot_id, post.id());
        assert!(!report.is_clean);

        let text = report.to_string();
        assert_eq!(
            text,
            "sw1: 1 only before, 1 only after, 1 moved, 0 unchanged\n\
             \x20 - bb:bb:bb:bb:bb:bb  Gi1/0/2\n\
             \x20 + cc:cc:cc:cc:cc:cc  Gi1/0/3\n\
             \x20 ~ aa:aa:aa:aa:aa:aa  Gi1/0/1 -> Gi1/0/5\n"
        );
    }

    #[test]
    fn test_clean_report() {
        let pre = snapshot(SnapshotPhase::Pre, &[("aa:aa:aa:aa:aa:aa", "Gi1/0/1")]);
        let post = snapshot(SnapshotPhase::Post, &[("aa:aa:aa:aa:aa:aa", "Gi1/0/1")]);

        let report = DiffReport::new(&pre, &post, reconcile(&pre, &post));
        assert!(report.is_clean);
        assert!(report.to_string().contains("no CAM table drift detected"));

        let value: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["isClean"], true);
        assert_eq!(value["summary"]["unchanged"], 1);
        assert_eq!(value["diff"]["unchanged"][0]["port"], "Gi1/0/1");
    }
}
