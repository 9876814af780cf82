//! Orchestration of a migration check: capture a snapshot before the
//! migration, capture another after it, then reconcile the two

pub mod check;
pub mod config;

pub use check::*;
pub use config::*;
