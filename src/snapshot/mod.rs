//! Snapshot construction: ingestion of parsed device output and deduplication

pub mod builder;
pub mod ingest;

pub use builder::*;
pub use ingest::*;
