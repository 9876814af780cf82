//! Conversion of parsed `show mac address-table` records into entries

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::types::*;

/// Port field as emitted by the upstream parser, either a single interface
/// or a list of interfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPort {
    Single(String),
    Many(Vec<String>),
}

impl RawPort {
    /// The interface the address was learned on
    pub fn primary(&self) -> Option<&str> {
        match self {
            RawPort::Single(port) => Some(port.as_str()),
            RawPort::Many(ports) => ports.first().map(String::as_str),
        }
    }
}

/// One structured record produced by the device output parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCamRecord {
    #[serde(default)]
    pub destination_address: Option<String>,
    #[serde(default)]
    pub destination_port: Option<RawPort>,
    #[serde(default)]
    pub vlan: Option<Value>,
    #[serde(default, rename = "type")]
    pub entry_type: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl RawCamRecord {
    /// Create a record with just an address and a port
    pub fn new(address: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            destination_address: Some(address.into()),
            destination_port: Some(RawPort::Single(port.into())),
            ..Default::default()
        }
    }
}

impl TryFrom<RawCamRecord> for CamEntry {
    type Error = ReconcileError;

    fn try_from(raw: RawCamRecord) -> ReconcileResult<Self> {
        let address = raw.destination_address.as_deref().ok_or_else(|| {
            ReconcileError::MalformedEntry("missing destination_address".to_string())
        })?;
        let port = raw
            .destination_port
            .as_ref()
            .and_then(RawPort::primary)
            .ok_or_else(|| {
                ReconcileError::MalformedEntry(format!(
                    "missing destination_port for {}",
                    address
                ))
            })?;

        let metadata = CamMetadata {
            vlan: raw.vlan.as_ref().and_then(value_to_string),
            entry_type: raw
                .entry_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            extra: raw
                .extra
                .iter()
                .filter_map(|(key, value)| value_to_string(value).map(|v| (key.clone(), v)))
                .collect(),
        };

        Ok(CamEntry::parse(address, port)?.with_metadata(metadata))
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Convert parsed records into entries, failing on the first malformed record
pub fn ingest_records(records: Vec<RawCamRecord>) -> ReconcileResult<Vec<CamEntry>> {
    let total = records.len();
    let entries = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            CamEntry::try_from(record).map_err(|err| match err {
                ReconcileError::MalformedEntry(reason) => {
                    ReconcileError::MalformedEntry(format!("record {}: {}", index, reason))
                }
                other => other,
            })
        })
        .collect::<ReconcileResult<Vec<_>>>()?;

    debug!(records = total, "ingested CAM records");
    Ok(entries)
}

/// Parse a JSON array of parser records
pub fn parse_records(json: &str) -> ReconcileResult<Vec<RawCamRecord>> {
    Ok(serde_json::from_str(json)?)
}
