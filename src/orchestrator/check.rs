//! Per-device migration check that coordinates capture, storage and reconciliation

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::orchestrator::{CheckConfig, RunMode};
use crate::reconciliation::{DiffReport, ReconciliationEngine};
use crate::snapshot::{ingest_records, parse_records, RawCamRecord, SnapshotBuilder};
use crate::traits::*;
use crate::types::*;
use crate::utils::NormalizedEntryValidator;

/// What a single run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RunOutcome {
    /// A snapshot was captured and stored
    Captured {
        snapshot_id: Uuid,
        device: String,
        phase: SnapshotPhase,
        entries: usize,
        duplicates: usize,
    },
    /// The stored snapshots were reconciled
    Diffed(DiffReport),
}

/// Migration check for one device at a time, backed by a snapshot store
pub struct MigrationCheck<S: SnapshotStore> {
    storage: S,
    config: CheckConfig,
    engine: ReconciliationEngine,
}

impl<S: SnapshotStore> MigrationCheck<S> {
    /// Create a new check with the default configuration
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, CheckConfig::default())
    }

    /// Create a new check with a custom configuration
    pub fn with_config(storage: S, config: CheckConfig) -> Self {
        let engine = ReconciliationEngine::with_options(config.reconcile_options());
        Self {
            storage,
            config,
            engine,
        }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Ingest collected records for a device and store them as a snapshot
    pub async fn capture(
        &mut self,
        device: &str,
        phase: SnapshotPhase,
        records: Vec<RawCamRecord>,
    ) -> ReconcileResult<Snapshot> {
        let entries = ingest_records(records)?;
        let snapshot = SnapshotBuilder::new(device, phase)
            .policy(self.config.duplicate_policy)
            .validator(Box::new(NormalizedEntryValidator))
            .entries(entries)
            .build()?;

        if !snapshot.duplicates().is_empty() {
            warn!(
                device,
                phase = %phase,
                duplicates = snapshot.duplicates().len(),
                "snapshot contained duplicate addresses"
            );
        }

        self.storage.save_snapshot(&snapshot).await?;
        info!(
            device,
            phase = %phase,
            site = self.config.site.as_deref().unwrap_or(""),
            snapshot_id = %snapshot.id(),
            entries = snapshot.len(),
            "captured CAM snapshot"
        );
        Ok(snapshot)
    }

    /// Same as [`capture`](Self::capture) for a JSON array of records
    pub async fn capture_json(
        &mut self,
        device: &str,
        phase: SnapshotPhase,
        json: &str,
    ) -> ReconcileResult<Snapshot> {
        let records = parse_records(json)?;
        self.capture(device, phase, records).await
    }

    /// Reconcile the stored pre and post snapshots of a device
    pub async fn diff(&self, device: &str) -> ReconcileResult<DiffReport> {
        let pre = self.load(device, SnapshotPhase::Pre).await?;
        let post = self.load(device, SnapshotPhase::Post).await?;

        let report = DiffReport::new(&pre, &post, self.engine.reconcile(&pre, &post));
        info!(
            device,
            site = self.config.site.as_deref().unwrap_or(""),
            clean = report.is_clean,
            drift = report.summary.drift(),
            "reconciled CAM snapshots"
        );
        Ok(report)
    }

    /// Run a check in the given mode
    ///
    /// `Pre` and `Post` need the records collected from the device; `Diff`
    /// ignores them.
    pub async fn run(
        &mut self,
        mode: RunMode,
        device: &str,
        records: Option<Vec<RawCamRecord>>,
    ) -> ReconcileResult<RunOutcome> {
        let Some(phase) = mode.phase() else {
            return Ok(RunOutcome::Diffed(self.diff(device).await?));
        };

        let records = records.ok_or_else(|| {
            ReconcileError::Config(format!(
                "mode {} requires records collected from {}",
                mode, device
            ))
        })?;

        let snapshot = self.capture(device, phase, records).await?;
        Ok(RunOutcome::Captured {
            snapshot_id: snapshot.id(),
            device: snapshot.device().to_string(),
            phase,
            entries: snapshot.len(),
            duplicates: snapshot.duplicates().len(),
        })
    }

    /// Run a check in the configured mode
    pub async fn run_configured(
        &mut self,
        device: &str,
        records: Option<Vec<RawCamRecord>>,
    ) -> ReconcileResult<RunOutcome> {
        let mode = self.config.mode;
        self.run(mode, device, records).await
    }

    async fn load(&self, device: &str, phase: SnapshotPhase) -> ReconcileResult<Snapshot> {
        self.storage
            .get_snapshot(device, phase)
            .await?
            .ok_or_else(|| ReconcileError::SnapshotNotFound {
                device: device.to_string(),
                phase,
            })
    }
}
