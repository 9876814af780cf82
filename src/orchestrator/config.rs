//! Migration check configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::reconciliation::ReconcileOptions;
use crate::types::*;

/// What a migration check run does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Collect and store the pre-migration snapshot
    #[default]
    #[serde(alias = "1")]
    Pre,
    /// Collect and store the post-migration snapshot
    #[serde(alias = "2")]
    Post,
    /// Reconcile the stored pre and post snapshots
    Diff,
}

impl RunMode {
    /// Snapshot phase captured by this mode, `None` for [`RunMode::Diff`]
    pub fn phase(&self) -> Option<SnapshotPhase> {
        match self {
            RunMode::Pre => Some(SnapshotPhase::Pre),
            RunMode::Post => Some(SnapshotPhase::Post),
            RunMode::Diff => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Pre => "pre",
            RunMode::Post => "post",
            RunMode::Diff => "diff",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ReconcileError;

    /// Accepts the mode names and the numbers of the interactive menu
    /// (`1` pre, `2` post)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre" | "1" => Ok(RunMode::Pre),
            "post" | "2" => Ok(RunMode::Post),
            "diff" => Ok(RunMode::Diff),
            other => Err(ReconcileError::Config(format!(
                "unknown run mode '{}', expected pre, post or diff",
                other
            ))),
        }
    }
}

/// Configuration of a [`MigrationCheck`](crate::orchestrator::MigrationCheck)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    pub mode: RunMode,
    pub duplicate_policy: DuplicatePolicy,
    pub materialize_unchanged: bool,
    /// Site code, used to label logs
    pub site: Option<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            duplicate_policy: DuplicatePolicy::default(),
            materialize_unchanged: true,
            site: None,
        }
    }
}

impl CheckConfig {
    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> ReconcileResult<Self> {
        serde_json::from_str(json).map_err(|err| ReconcileError::Config(err.to_string()))
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            materialize_unchanged: self.materialize_unchanged,
        }
    }
}
