//! Reconciliation of pre- and post-migration CAM snapshots
//!
//! The engine partitions the addresses of two snapshots into four disjoint
//! buckets: learned only before, learned only after, moved to another port,
//! and unchanged. It is a pure computation; loading and storing snapshots is
//! left to [`crate::orchestrator`].

pub mod engine;
pub mod report;

pub use engine::*;
pub use report::*;
