//! # CAM Diff Core
//!
//! Verification of network switch migrations by reconciling CAM table
//! snapshots taken before and after the migration.
//!
//! ## Features
//!
//! - **Typed entries**: MAC addresses normalized at ingestion, ports compared as opaque strings
//! - **Reconciliation**: Linear-time partition into only-before, only-after, moved and unchanged
//! - **Deterministic duplicates**: Last-seen-wins resolution, recorded on the snapshot, or strict rejection
//! - **Ingestion**: Structured `show mac address-table` records in the upstream parser's JSON shape
//! - **Orchestration**: Pre/post/diff runs over a pluggable snapshot store
//!
//! ## Quick Start
//!
//! ```rust
//! use camdiff_core::{reconcile, CamEntry, Snapshot, SnapshotPhase};
//!
//! let pre = Snapshot::from_entries(
//!     "access-sw1",
//!     SnapshotPhase::Pre,
//!     vec![CamEntry::parse("0050.7966.6800", "Gi1/0/1")?],
//! )?;
//! let post = Snapshot::from_entries(
//!     "access-sw1",
//!     SnapshotPhase::Post,
//!     vec![CamEntry::parse("00:50:79:66:68:00", "Gi1/0/5")?],
//! )?;
//!
//! let diff = reconcile(&pre, &post);
//! assert_eq!(diff.moved[0].old_port, "Gi1/0/1");
//! assert_eq!(diff.moved[0].new_port, "Gi1/0/5");
//! # Ok::<(), camdiff_core::ReconcileError>(())
//! ```

pub mod orchestrator;
pub mod reconciliation;
pub mod snapshot;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use orchestrator::*;
pub use reconciliation::*;
pub use snapshot::*;
pub use traits::*;
pub use types::*;
